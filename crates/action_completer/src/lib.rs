//! Interactive-prompt action resolution and completion engine.
//!
//! Applications register a tree of named groups and actions once, then hand the engine the live
//! prompt buffer on every keystroke ([`ActionCompleter::complete`]), on submission
//! ([`ActionCompleter::validate`]), and to run the typed action ([`ActionCompleter::execute`]).
//! Every call re-tokenizes and re-resolves the buffer; the tree is read-only while querying.
//!
//! ```rust
//! use action_completer::{ActionCompleter, ActionOptions, ActionParam, ParamSource, ParamValue};
//! use serde_json::json;
//!
//! let mut completer = ActionCompleter::default();
//! let root = completer.root();
//! completer
//!     .register_action(
//!         root,
//!         "hello",
//!         vec![ActionParam::new("name").source(ParamSource::choices(["Mark", "John", "William"]))],
//!         |args: &[ParamValue]| Ok(json!(format!("Hello, {}!", args[0].as_str().unwrap_or_default()))),
//!         ActionOptions::new(),
//!     )
//!     .expect("register hello");
//!
//! assert_eq!(completer.complete("hello Jo", 8).values(), vec!["John"]);
//! assert_eq!(completer.execute("hello John").expect("execute"), json!("Hello, John!"));
//! ```

#![warn(missing_docs, rustdoc::broken_intra_doc_links)]

mod completion;
mod config;
pub mod display;
mod error;
mod executor;
pub mod fuzzy;
pub mod param;
mod path_completer;
pub mod resolver;
pub mod tree;
mod validator;

pub use action_completer_contract::{
    CompletionCandidate, CompletionResponse, DisplayText, Fragment, NodeKind, NodePath, ParamValue,
    StyledSpan, ValidationOutcome,
};
pub use action_lexer::{decode_completion, encode_completion, tokenize, Tokenized};
pub use config::{CompleterConfig, DEFAULT_FUZZY_TOLERANCE};
pub use display::{Completable, DisplayAttributes, Lazy, LazyStyle, LazyText};
pub use error::{CastError, ConfigError, ExecuteError, HandlerError, RegistrationError};
pub use executor::ResolvedAction;
pub use param::{ActionParam, Cast, ParamSource, SubCompleter, SubCompletion};
pub use path_completer::PathCompleter;
pub use resolver::{MatchKind, Resolution};
pub use tree::{ActionId, ActionOptions, ActionTree, GroupId, GroupOptions, NodeId};

use std::rc::Rc;

use serde_json::Value;
use tracing::{debug, warn};

/// Engine owning the action tree and its configuration.
pub struct ActionCompleter {
    tree: ActionTree,
    config: CompleterConfig,
}

impl Default for ActionCompleter {
    fn default() -> Self {
        Self::new(CompleterConfig::default())
    }
}

impl ActionCompleter {
    /// Creates an engine with an empty root group.
    pub fn new(config: CompleterConfig) -> Self {
        Self {
            tree: ActionTree::default(),
            config,
        }
    }

    /// Creates an engine with explicit root group options.
    ///
    /// The root is never offered as a candidate and is always active, so display attributes and
    /// activation predicates set here have no effect beyond a warning.
    pub fn with_root_options(config: CompleterConfig, options: GroupOptions) -> Self {
        if options.attributes.is_set() {
            warn!("display attributes on the root group are never rendered");
        }
        if options.active.is_some() {
            warn!("the root group is always active; its activation predicate is ignored");
        }
        Self {
            tree: ActionTree::new(options),
            config,
        }
    }

    /// Returns the active configuration.
    pub fn config(&self) -> &CompleterConfig {
        &self.config
    }

    /// Returns the action tree.
    pub fn tree(&self) -> &ActionTree {
        &self.tree
    }

    /// Returns the root group handle.
    pub fn root(&self) -> GroupId {
        self.tree.root()
    }

    /// Registers a group under `parent`. An existing sibling with the same name is replaced in
    /// place.
    pub fn register_group(
        &mut self,
        parent: GroupId,
        name: &str,
        options: GroupOptions,
    ) -> Result<GroupId, RegistrationError> {
        let id = self.tree.insert_group(parent, name, options)?;
        debug!(path = %self.tree.path(id.node()), "registered group");
        Ok(id)
    }

    /// Registers an action under `parent`. An existing sibling with the same name is replaced in
    /// place.
    pub fn register_action<F>(
        &mut self,
        parent: GroupId,
        name: &str,
        params: Vec<ActionParam>,
        handler: F,
        options: ActionOptions,
    ) -> Result<ActionId, RegistrationError>
    where
        F: Fn(&[ParamValue]) -> Result<Value, HandlerError> + 'static,
    {
        let params_len = params.len();
        let id = self
            .tree
            .insert_action(parent, name, params, Rc::new(handler), options)?;
        debug!(
            path = %self.tree.path(id.node()),
            params = params_len,
            "registered action"
        );
        Ok(id)
    }

    /// Walks `fragments` down the tree.
    pub fn resolve<'f>(&self, fragments: &'f [Fragment]) -> Resolution<'f> {
        resolver::resolve(&self.tree, fragments, self.config.fuzzy_tolerance)
    }

    /// Returns candidates for the fragment ending at `cursor` and the byte range they replace.
    pub fn complete(&self, buffer: &str, cursor: usize) -> CompletionResponse {
        completion::complete(&self.tree, &self.config, buffer, cursor)
    }

    /// Checks whether `buffer` names an executable action with acceptable parameters.
    pub fn validate(&self, buffer: &str) -> ValidationOutcome {
        validator::validate(&self.tree, &self.config, buffer)
    }

    /// Validates `buffer` and casts its parameters without running the action.
    pub fn resolve_executable(&self, buffer: &str) -> Result<ResolvedAction, ExecuteError> {
        executor::resolve_executable(&self.tree, &self.config, buffer)
    }

    /// Validates, casts, and runs the action named by `buffer`.
    pub fn execute(&self, buffer: &str) -> Result<Value, ExecuteError> {
        self.resolve_executable(buffer)?.invoke()
    }
}
