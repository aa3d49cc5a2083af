//! Action parameters: completion sources, casts, and validator predicates.

use std::{fmt, rc::Rc};

use action_completer_contract::{CompletionCandidate, DisplayText, ParamValue};

use crate::{
    display::{display_builders, Completable, DisplayAttributes},
    tree::ActionNode,
};

/// Nested completer consulted by [`ParamSource::Completer`].
///
/// Implementations may block (a filesystem listing, for instance); the engine calls them
/// synchronously and never caches their output.
pub trait SubCompleter {
    /// Produces candidates for the partially typed value.
    fn complete(&self, partial: &str) -> Vec<SubCompletion>;
}

impl<F> SubCompleter for F
where
    F: Fn(&str) -> Vec<SubCompletion>,
{
    fn complete(&self, partial: &str) -> Vec<SubCompletion> {
        self(partial)
    }
}

/// One candidate produced by a [`SubCompleter`].
///
/// Present overrides win over the parameter's own display attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCompletion {
    /// Replacement text for the whole fragment.
    pub text: String,
    /// Menu text override.
    pub display: Option<DisplayText>,
    /// Description override.
    pub display_meta: Option<DisplayText>,
    /// Style override.
    pub style: Option<String>,
}

impl SubCompletion {
    /// Creates a completion without overrides.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            display: None,
            display_meta: None,
            style: None,
        }
    }

    /// Sets the menu text override.
    pub fn with_display(mut self, display: impl Into<DisplayText>) -> Self {
        self.display = Some(display.into());
        self
    }

    /// Sets the description override.
    pub fn with_display_meta(mut self, display_meta: impl Into<DisplayText>) -> Self {
        self.display_meta = Some(display_meta.into());
        self
    }

    /// Sets the style override.
    pub fn with_style(mut self, style: impl Into<String>) -> Self {
        self.style = Some(style.into());
        self
    }
}

impl From<&str> for SubCompletion {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for SubCompletion {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Callable producing candidate strings from `(action, param, current value)`.
pub type DynamicSource = Rc<dyn Fn(&ActionNode, &ActionParam, &str) -> Vec<String>>;

/// Where a parameter slot gets its completion candidates from.
#[derive(Clone, Default)]
pub enum ParamSource {
    /// No candidates; the slot still consumes, validates, and casts one fragment.
    #[default]
    None,
    /// Exactly one candidate, whatever has been typed.
    Value(String),
    /// The full ordered candidate universe; narrowing happens at the completion surface.
    Choices(Vec<String>),
    /// Candidates delegated to a nested completer.
    Completer(Rc<dyn SubCompleter>),
    /// Candidates computed by a callable each time.
    Dynamic(DynamicSource),
}

impl ParamSource {
    /// Builds a fixed set source.
    pub fn choices<I, S>(choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Choices(choices.into_iter().map(Into::into).collect())
    }

    /// Builds a delegated source.
    pub fn completer(completer: impl SubCompleter + 'static) -> Self {
        Self::Completer(Rc::new(completer))
    }

    /// Builds a dynamic source.
    pub fn dynamic<F>(source: F) -> Self
    where
        F: Fn(&ActionNode, &ActionParam, &str) -> Vec<String> + 'static,
    {
        Self::Dynamic(Rc::new(source))
    }

    /// Yields this source's candidate universe for `current`, with unencoded values.
    ///
    /// Only [`ParamSource::Completer`] and [`ParamSource::Dynamic`] look at `current`; a fixed
    /// set is returned whole and narrowed later by the completion surface.
    pub fn candidates<'a>(
        &'a self,
        action: &'a ActionNode,
        param: &'a ActionParam,
        current: &str,
    ) -> Box<dyn Iterator<Item = CompletionCandidate> + 'a> {
        let render = move |text: &str| param.attributes.render(Completable::Param(param), text);
        match self {
            Self::None => Box::new(std::iter::empty::<CompletionCandidate>()),
            Self::Value(value) => Box::new(std::iter::once(render(value.as_str()))),
            Self::Choices(choices) => Box::new(choices.iter().map(move |choice| render(choice.as_str()))),
            Self::Completer(completer) => {
                Box::new(completer.complete(current).into_iter().map(move |completion| {
                    let mut candidate = render(completion.text.as_str());
                    if let Some(display) = completion.display {
                        candidate.display = display;
                    }
                    if completion.display_meta.is_some() {
                        candidate.display_meta = completion.display_meta;
                    }
                    if let Some(style) = completion.style {
                        candidate.style = style;
                    }
                    candidate
                }))
            }
            Self::Dynamic(source) => Box::new(
                source(action, param, current)
                    .into_iter()
                    .map(move |text| render(text.as_str())),
            ),
        }
    }

    /// Returns whether the completion surface narrows this source's output by fuzzy rank.
    pub(crate) fn is_filtered(&self) -> bool {
        matches!(self, Self::Choices(_) | Self::Dynamic(_))
    }

    /// Returns the accepted values for choice validation, or `None` when unconstrained.
    pub(crate) fn accepted_values(
        &self,
        action: &ActionNode,
        param: &ActionParam,
        raw: &str,
    ) -> Option<Vec<String>> {
        match self {
            Self::Value(value) => Some(vec![value.clone()]),
            Self::Choices(choices) => Some(choices.clone()),
            Self::Dynamic(source) => Some(source(action, param, raw)),
            Self::None | Self::Completer(_) => None,
        }
    }
}

impl fmt::Debug for ParamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Self::Choices(choices) => f.debug_tuple("Choices").field(choices).finish(),
            Self::Completer(_) => f.write_str("Completer(..)"),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// Custom cast function.
pub type CastFn = Rc<dyn Fn(&str) -> Result<ParamValue, String>>;

/// Conversion applied to a raw parameter string before it reaches the handler.
#[derive(Clone, Default)]
pub enum Cast {
    /// Pass the raw string through.
    #[default]
    Identity,
    /// Parse a signed integer.
    Int,
    /// Parse a floating-point number.
    Float,
    /// Parse `true`/`false`, `on`/`off`, `yes`/`no`, or `1`/`0`.
    Bool,
    /// Arbitrary conversion.
    Custom(CastFn),
}

impl Cast {
    /// Wraps a custom cast function.
    pub fn custom<F>(cast: F) -> Self
    where
        F: Fn(&str) -> Result<ParamValue, String> + 'static,
    {
        Self::Custom(Rc::new(cast))
    }

    /// Applies the cast to `raw`.
    pub fn apply(&self, raw: &str) -> Result<ParamValue, String> {
        match self {
            Self::Identity => Ok(ParamValue::String(raw.to_string())),
            Self::Int => raw
                .parse::<i64>()
                .map(ParamValue::Int)
                .map_err(|err| err.to_string()),
            Self::Float => raw
                .parse::<f64>()
                .map(ParamValue::Float)
                .map_err(|err| err.to_string()),
            Self::Bool => match raw.to_ascii_lowercase().as_str() {
                "true" | "on" | "yes" | "1" => Ok(ParamValue::Bool(true)),
                "false" | "off" | "no" | "0" => Ok(ParamValue::Bool(false)),
                _ => Err(format!("expected a boolean, got {raw:?}")),
            },
            Self::Custom(cast) => cast(raw),
        }
    }
}

impl fmt::Debug for Cast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identity => f.write_str("Identity"),
            Self::Int => f.write_str("Int"),
            Self::Float => f.write_str("Float"),
            Self::Bool => f.write_str("Bool"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Validator predicate over `(param, raw value, raw values of the preceding parameters)`.
pub type ParamValidator = Rc<dyn Fn(&ActionParam, &str, &[String]) -> Result<(), String>>;

/// One positional parameter of an action.
#[derive(Clone)]
pub struct ActionParam {
    /// Parameter name, used in messages and cast errors.
    pub name: String,
    /// Completion source.
    pub source: ParamSource,
    /// Cast applied at execution time.
    pub cast: Cast,
    /// Validators run in order against the raw value.
    pub validators: Vec<ParamValidator>,
    /// Presentation attributes for this parameter's candidates.
    pub attributes: DisplayAttributes,
}

impl ActionParam {
    /// Creates an identity-cast parameter without a completion source.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: ParamSource::None,
            cast: Cast::Identity,
            validators: Vec::new(),
            attributes: DisplayAttributes::default(),
        }
    }

    /// Sets the completion source.
    pub fn source(mut self, source: ParamSource) -> Self {
        self.source = source;
        self
    }

    /// Sets the cast.
    pub fn cast(mut self, cast: Cast) -> Self {
        self.cast = cast;
        self
    }

    /// Appends a validator predicate.
    pub fn validator<F>(mut self, validator: F) -> Self
    where
        F: Fn(&ActionParam, &str, &[String]) -> Result<(), String> + 'static,
    {
        self.validators.push(Rc::new(validator));
        self
    }

    /// Runs the validators in declaration order, stopping at the first failure.
    pub fn run_validators(&self, raw: &str, preceding: &[String]) -> Result<(), String> {
        self.validators
            .iter()
            .try_for_each(|validator| validator(self, raw, preceding))
    }
}

display_builders!(ActionParam);

impl fmt::Debug for ActionParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionParam")
            .field("name", &self.name)
            .field("source", &self.source)
            .field("cast", &self.cast)
            .field("validators", &self.validators.len())
            .finish()
    }
}
