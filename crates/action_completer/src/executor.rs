//! Casting validated raw arguments and invoking action handlers.

use std::fmt;

use action_completer_contract::{NodePath, ParamValue};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    config::CompleterConfig,
    error::{CastError, ExecuteError},
    tree::{ActionHandler, ActionTree},
    validator::{action_path, check},
};

/// A validated action bound to its cast arguments, ready to run.
#[derive(Clone)]
pub struct ResolvedAction {
    /// Full path of the resolved action.
    pub path: NodePath,
    /// Cast positional arguments.
    pub args: Vec<ParamValue>,
    handler: ActionHandler,
}

impl ResolvedAction {
    /// Returns the action callable.
    pub fn handler(&self) -> &ActionHandler {
        &self.handler
    }

    /// Invokes the handler with the cast arguments.
    pub fn invoke(&self) -> Result<Value, ExecuteError> {
        info!(action = %self.path, args = self.args.len(), "executing action");
        (self.handler)(&self.args).map_err(|source| ExecuteError::Execution {
            path: self.path.display(),
            source,
        })
    }
}

impl fmt::Debug for ResolvedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedAction")
            .field("path", &self.path)
            .field("args", &self.args)
            .finish()
    }
}

pub(crate) fn resolve_executable(
    tree: &ActionTree,
    config: &CompleterConfig,
    buffer: &str,
) -> Result<ResolvedAction, ExecuteError> {
    let checked = check(tree, config, buffer)?;
    let args = checked
        .args
        .iter()
        .map(|arg| match arg.param {
            Some(param) => param.cast.apply(&arg.raw).map_err(|message| CastError {
                param: param.name.clone(),
                raw: arg.raw.clone(),
                message,
            }),
            None => Ok(ParamValue::String(arg.raw.clone())),
        })
        .collect::<Result<Vec<_>, _>>()
        .inspect_err(|err| debug!(%err, "cast failed"))?;

    Ok(ResolvedAction {
        path: action_path(tree, &checked),
        args,
        handler: checked.action.handler().clone(),
    })
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::{
        error::HandlerError,
        param::{ActionParam, Cast},
        tree::{ActionOptions, GroupOptions},
    };

    #[test]
    fn cast_failure_skips_handler() {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let mut tree = ActionTree::default();
        let root = tree.root();
        let math = tree.insert_group(root, "math", GroupOptions::new()).expect("math");
        tree.insert_action(
            math,
            "double",
            vec![ActionParam::new("value").cast(Cast::Int)],
            Rc::new(move |args: &[ParamValue]| -> Result<Value, HandlerError> {
                counter.set(counter.get() + 1);
                Ok(json!(args[0].as_i64().unwrap_or_default() * 2))
            }),
            ActionOptions::new(),
        )
        .expect("double");
        let config = CompleterConfig::default();

        let err = resolve_executable(&tree, &config, "math double ab").expect_err("cast");
        assert!(matches!(
            err,
            ExecuteError::Cast(CastError { ref param, ref raw, .. }) if param == "value" && raw == "ab"
        ));
        assert_eq!(calls.get(), 0);

        let resolved = resolve_executable(&tree, &config, "math double 21").expect("resolved");
        assert_eq!(resolved.path.display(), "math double");
        assert_eq!(resolved.args, vec![ParamValue::Int(21)]);
        assert_eq!(resolved.invoke().expect("invoke"), json!(42));
        assert_eq!(calls.get(), 1);
    }
}
