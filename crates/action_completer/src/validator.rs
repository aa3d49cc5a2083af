//! Whole-buffer validation: parameter count, validator predicates, and choice membership.

use action_completer_contract::{NodePath, ValidationOutcome};
use action_lexer::tokenize;
use tracing::debug;

use crate::{
    config::CompleterConfig,
    error::ExecuteError,
    fuzzy,
    param::ActionParam,
    resolver::resolve,
    tree::{ActionNode, ActionTree, Node, NodeId},
};

/// Raw value bound to one parameter slot.
pub(crate) struct RawArg<'t> {
    /// Declared parameter, `None` for surplus captured by a parameterless action.
    pub param: Option<&'t ActionParam>,
    pub raw: String,
    /// Buffer offset of the first fragment contributing to `raw`.
    pub offset: usize,
}

/// An action whose raw arguments passed validation.
pub(crate) struct CheckedAction<'t> {
    pub id: NodeId,
    pub action: &'t ActionNode,
    pub args: Vec<RawArg<'t>>,
}

/// Why a buffer is not executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Rejection {
    Incomplete { offset: usize, message: Option<String> },
    Invalid { offset: usize, message: String },
}

impl From<Rejection> for ValidationOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Incomplete { offset, message } => Self::Incomplete { offset, message },
            Rejection::Invalid { offset, message } => Self::Invalid { offset, message },
        }
    }
}

impl From<Rejection> for ExecuteError {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Incomplete { offset, message } => Self::Incomplete {
                offset,
                message: message.unwrap_or_else(|| "more input is required".to_string()),
            },
            Rejection::Invalid { offset, message } => Self::Invalid { offset, message },
        }
    }
}

pub(crate) fn validate(tree: &ActionTree, config: &CompleterConfig, buffer: &str) -> ValidationOutcome {
    match check(tree, config, buffer) {
        Ok(_) => ValidationOutcome::Valid,
        Err(rejection) => rejection.into(),
    }
}

/// Resolves and validates `buffer`, returning the action and its raw arguments.
pub(crate) fn check<'t>(
    tree: &'t ActionTree,
    config: &CompleterConfig,
    buffer: &str,
) -> Result<CheckedAction<'t>, Rejection> {
    let tokenized = tokenize(buffer);
    let resolution = resolve(tree, tokenized.words(), config.fuzzy_tolerance);

    let action = match tree.get(resolution.node) {
        Node::Action(action) => action,
        Node::Group(group) => {
            let next = resolution.remaining.first();
            let message = next.and_then(|fragment| {
                let children = tree.active_children(group).map(|(name, _)| name).collect::<Vec<_>>();
                fuzzy::best_match(&fragment.text, children.iter().copied())
                    .filter(|(_, score)| *score > 0)
                    .map(|(index, _)| {
                        format!("unknown action '{}', did you mean '{}'", fragment.text, children[index])
                    })
            });
            let rejection = Rejection::Incomplete {
                offset: next.map_or(buffer.len(), |fragment| fragment.start),
                message,
            };
            debug!(?rejection, "buffer names a group");
            return Err(rejection);
        }
    };

    let path = tree.path(resolution.node);
    let values = resolution.remaining;
    let params = action.params();
    if values.len() < params.len() {
        return Err(Rejection::Incomplete {
            offset: buffer.len(),
            message: Some(format!(
                "missing parameters for '{path}', expected {} received {}",
                params.len(),
                values.len()
            )),
        });
    }
    if values.len() > params.len() && !action.capture_all() {
        let rejection = Rejection::Invalid {
            offset: values[params.len()].start,
            message: format!(
                "too many arguments for '{path}', expected {} received {}",
                params.len(),
                values.len()
            ),
        };
        debug!(?rejection, "surplus parameters");
        return Err(rejection);
    }

    let join = |from: usize| {
        values[from..]
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    };
    let mut args = params
        .iter()
        .enumerate()
        .map(|(index, param)| {
            let last = index + 1 == params.len();
            RawArg {
                param: Some(param),
                raw: if last && action.capture_all() {
                    join(index)
                } else {
                    values[index].text.clone()
                },
                offset: values[index].start,
            }
        })
        .collect::<Vec<_>>();
    if params.is_empty() && !values.is_empty() {
        args.push(RawArg {
            param: None,
            raw: join(0),
            offset: values[0].start,
        });
    }

    for (index, arg) in args.iter().enumerate() {
        let Some(param) = arg.param else {
            continue;
        };
        let preceding = args[..index]
            .iter()
            .map(|arg| arg.raw.clone())
            .collect::<Vec<_>>();
        let verdict = if param.validators.is_empty() {
            if config.validate_choices {
                check_choices(action, param, &arg.raw)
            } else {
                Ok(())
            }
        } else {
            param.run_validators(&arg.raw, &preceding)
        };
        if let Err(message) = verdict {
            let rejection = Rejection::Invalid {
                offset: arg.offset,
                message,
            };
            debug!(action = %path, param = %param.name, ?rejection, "parameter rejected");
            return Err(rejection);
        }
    }

    Ok(CheckedAction {
        id: resolution.node,
        action,
        args,
    })
}

fn check_choices(action: &ActionNode, param: &ActionParam, raw: &str) -> Result<(), String> {
    let Some(accepted) = param.source.accepted_values(action, param, raw) else {
        return Ok(());
    };
    if accepted.is_empty() || accepted.iter().any(|value| value == raw) {
        return Ok(());
    }
    if let [only] = accepted.as_slice() {
        return Err(format!("invalid value '{raw}', expected '{only}'"));
    }
    match fuzzy::best_match(raw, accepted.iter().map(String::as_str)) {
        Some((index, score)) if score > 0 => Err(format!(
            "invalid value '{raw}', did you mean '{}'",
            accepted[index]
        )),
        _ => Err(format!("invalid value '{raw}'")),
    }
}

/// Renders the path used in messages for an already checked action.
pub(crate) fn action_path(tree: &ActionTree, checked: &CheckedAction<'_>) -> NodePath {
    tree.path(checked.id)
}
