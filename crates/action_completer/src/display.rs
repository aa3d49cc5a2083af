//! Lazily resolved display and style attributes for completion candidates.

use std::{fmt, rc::Rc};

use action_completer_contract::{CompletionCandidate, DisplayText, StyledSpan};

use crate::{
    param::ActionParam,
    tree::{ActionNode, GroupNode},
};

/// Placeholder replaced by the candidate text in literal display values.
pub const COMPLETION_PLACEHOLDER: &str = "{completion}";

/// Borrowed view of whatever produced a completion candidate.
#[derive(Clone, Copy)]
pub enum Completable<'a> {
    /// A group child.
    Group(&'a GroupNode),
    /// An action child.
    Action(&'a ActionNode),
    /// An action parameter value.
    Param(&'a ActionParam),
}

impl Completable<'_> {
    /// Returns the node or parameter name.
    pub fn name(&self) -> &str {
        match self {
            Self::Group(group) => group.name(),
            Self::Action(action) => action.name(),
            Self::Param(param) => &param.name,
        }
    }
}

impl fmt::Debug for Completable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Self::Group(_) => "Group",
            Self::Action(_) => "Action",
            Self::Param(_) => "Param",
        };
        f.debug_tuple(kind).field(&self.name()).finish()
    }
}

/// Values that support `{completion}` interpolation.
pub trait Interpolate: Clone {
    /// Returns a copy with every placeholder replaced by `completion`.
    fn interpolate(&self, completion: &str) -> Self;
}

impl Interpolate for String {
    fn interpolate(&self, completion: &str) -> Self {
        self.replace(COMPLETION_PLACEHOLDER, completion)
    }
}

impl Interpolate for DisplayText {
    fn interpolate(&self, completion: &str) -> Self {
        match self {
            Self::Plain(text) => Self::Plain(text.interpolate(completion)),
            Self::Styled(spans) => Self::Styled(
                spans
                    .iter()
                    .map(|span| StyledSpan::new(span.style.clone(), span.text.interpolate(completion)))
                    .collect(),
            ),
        }
    }
}

/// Computes a display value from the completable and the candidate text.
pub type ComputeFn<T> = Rc<dyn for<'a> Fn(Completable<'a>, &str) -> T>;

/// A literal value or a function evaluated each time a candidate is rendered.
pub enum Lazy<T> {
    /// Fixed value; `{completion}` placeholders are substituted.
    Literal(T),
    /// Computed per candidate, never memoized.
    Computed(ComputeFn<T>),
}

impl<T: Interpolate> Lazy<T> {
    /// Wraps a compute function.
    pub fn computed<F>(compute: F) -> Self
    where
        F: for<'a> Fn(Completable<'a>, &str) -> T + 'static,
    {
        Self::Computed(Rc::new(compute))
    }

    /// Resolves the value for one candidate.
    pub fn resolve(&self, source: Completable<'_>, text: &str) -> T {
        match self {
            Self::Literal(value) => value.interpolate(text),
            Self::Computed(compute) => compute(source, text),
        }
    }
}

impl<T: Clone> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Computed(compute) => Self::Computed(Rc::clone(compute)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Display text that may be computed per candidate.
pub type LazyText = Lazy<DisplayText>;

/// Style string that may be computed per candidate.
pub type LazyStyle = Lazy<String>;

impl From<&str> for LazyText {
    fn from(value: &str) -> Self {
        Self::Literal(DisplayText::from(value))
    }
}

impl From<String> for LazyText {
    fn from(value: String) -> Self {
        Self::Literal(DisplayText::from(value))
    }
}

impl From<DisplayText> for LazyText {
    fn from(value: DisplayText) -> Self {
        Self::Literal(value)
    }
}

impl From<Vec<StyledSpan>> for LazyText {
    fn from(value: Vec<StyledSpan>) -> Self {
        Self::Literal(DisplayText::Styled(value))
    }
}

impl From<&str> for LazyStyle {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for LazyStyle {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

/// Pass-through presentation attributes shared by groups, actions, and parameters.
#[derive(Debug, Clone, Default)]
pub struct DisplayAttributes {
    /// Menu text; defaults to the candidate value.
    pub display: Option<LazyText>,
    /// Description shown next to the candidate.
    pub display_meta: Option<LazyText>,
    /// Row style.
    pub style: Option<LazyStyle>,
    /// Selected row style.
    pub selected_style: Option<LazyStyle>,
}

impl DisplayAttributes {
    /// Returns whether any attribute is set.
    pub fn is_set(&self) -> bool {
        self.display.is_some()
            || self.display_meta.is_some()
            || self.style.is_some()
            || self.selected_style.is_some()
    }

    /// Renders a candidate for `text`; unset display falls back to the text itself.
    pub fn render(&self, source: Completable<'_>, text: &str) -> CompletionCandidate {
        let resolve_style = |style: &Option<LazyStyle>| {
            style
                .as_ref()
                .map(|style| style.resolve(source, text))
                .unwrap_or_default()
        };
        CompletionCandidate {
            value: text.to_string(),
            display: self
                .display
                .as_ref()
                .map_or_else(|| DisplayText::from(text), |display| display.resolve(source, text)),
            display_meta: self
                .display_meta
                .as_ref()
                .map(|display_meta| display_meta.resolve(source, text)),
            style: resolve_style(&self.style),
            selected_style: resolve_style(&self.selected_style),
        }
    }
}

/// Implements the presentation builder methods for an options type holding `attributes`.
macro_rules! display_builders {
    ($target:ty) => {
        impl $target {
            /// Sets the menu text.
            pub fn display(mut self, display: impl Into<$crate::display::LazyText>) -> Self {
                self.attributes.display = Some(display.into());
                self
            }

            /// Sets the description text.
            pub fn display_meta(mut self, display_meta: impl Into<$crate::display::LazyText>) -> Self {
                self.attributes.display_meta = Some(display_meta.into());
                self
            }

            /// Sets the row style.
            pub fn style(mut self, style: impl Into<$crate::display::LazyStyle>) -> Self {
                self.attributes.style = Some(style.into());
                self
            }

            /// Sets the selected row style.
            pub fn selected_style(mut self, style: impl Into<$crate::display::LazyStyle>) -> Self {
                self.attributes.selected_style = Some(style.into());
                self
            }
        }
    };
}

pub(crate) use display_builders;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::param::ActionParam;

    #[test]
    fn literal_text_interpolates_completion() {
        let param = ActionParam::new("num");
        let meta = LazyText::from("Says hello to {completion}");
        assert_eq!(
            meta.resolve(Completable::Param(&param), "2"),
            DisplayText::Plain("Says hello to 2".to_string())
        );
    }

    #[test]
    fn styled_spans_interpolate_each_span() {
        let param = ActionParam::new("color");
        let display = LazyText::from(vec![
            StyledSpan::new("fg:{completion}", "{completion}"),
            StyledSpan::new("", "!"),
        ]);
        assert_eq!(
            display.resolve(Completable::Param(&param), "red"),
            DisplayText::Styled(vec![
                StyledSpan::new("fg:{completion}", "red"),
                StyledSpan::new("", "!"),
            ])
        );
    }

    #[test]
    fn computed_style_receives_source_and_text() {
        let param = ActionParam::new("color");
        let style = LazyStyle::computed(|source, text| format!("{}:{text}", source.name()));
        assert_eq!(style.resolve(Completable::Param(&param), "blue"), "color:blue");
    }

    #[test]
    fn render_defaults_display_to_text() {
        let param = ActionParam::new("name").display_meta("Greets {completion}");
        let candidate = param.attributes.render(Completable::Param(&param), "John");
        assert_eq!(candidate.display, DisplayText::from("John"));
        assert_eq!(candidate.display_meta, Some(DisplayText::from("Greets John")));
        assert_eq!(candidate.style, "");
    }
}
