use std::{cell::Cell, fs, rc::Rc};

use action_completer::{
    tokenize, ActionCompleter, ActionOptions, ActionParam, CompleterConfig, DisplayText,
    GroupOptions, MatchKind, ParamSource, ParamValue, PathCompleter, SubCompletion,
};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn ok(_: &[ParamValue]) -> Result<Value, action_completer::HandlerError> {
    Ok(Value::Null)
}

fn engine_with(config: CompleterConfig) -> ActionCompleter {
    let mut completer = ActionCompleter::new(config);
    let root = completer.root();
    let remote = completer
        .register_group(root, "remote", GroupOptions::new().display_meta("Manage {completion}"))
        .expect("remote");
    completer
        .register_action(
            remote,
            "add",
            vec![ActionParam::new("name"), ActionParam::new("url")],
            ok,
            ActionOptions::new(),
        )
        .expect("remote add");
    completer
        .register_action(
            remote,
            "remove",
            vec![ActionParam::new("name").source(ParamSource::choices(["origin", "upstream"]))],
            ok,
            ActionOptions::new(),
        )
        .expect("remote remove");
    completer
        .register_action(
            root,
            "hello",
            vec![ActionParam::new("name").source(ParamSource::choices(["Mark", "John", "William"]))],
            |args: &[ParamValue]| Ok(json!(format!("Hello, {}!", args[0].as_str().unwrap_or_default()))),
            ActionOptions::new().display_meta("Says hello"),
        )
        .expect("hello");
    completer
        .register_action(
            root,
            "greet",
            vec![ActionParam::new("who").source(ParamSource::choices(["Stephen Bunn"]))],
            ok,
            ActionOptions::new(),
        )
        .expect("greet");
    completer
}

fn engine() -> ActionCompleter {
    engine_with(CompleterConfig::default())
}

#[test]
fn empty_buffer_offers_every_active_child_in_registration_order() {
    let response = engine().complete("", 0);
    assert_eq!(response.values(), vec!["remote", "hello", "greet"]);
    assert_eq!((response.start, response.end), (0, 0));
    assert_eq!(
        response.candidates[0].display_meta,
        Some(DisplayText::from("Manage remote"))
    );
    assert_eq!(
        response.candidates[1].display_meta,
        Some(DisplayText::from("Says hello"))
    );
}

#[test]
fn partial_names_are_ranked_and_narrowed() {
    let response = engine().complete("remote re", 9);
    assert_eq!(response.values(), vec!["remove"]);
    assert_eq!((response.start, response.end), (7, 9));
}

#[test]
fn only_text_before_the_cursor_is_completed() {
    let response = engine().complete("hello Jo", 5);
    assert_eq!(response.values(), vec!["hello"]);
    assert_eq!((response.start, response.end), (0, 5));
}

#[test]
fn fixed_set_source_returns_full_universe_and_surface_narrows_it() {
    let completer = engine();
    let root = completer.tree().group(completer.root()).expect("root");
    let (_, hello) = root
        .children()
        .iter()
        .find(|(name, _)| name == "hello")
        .expect("hello registered");
    let Some(action_completer::tree::Node::Action(action)) = completer.tree().node(*hello) else {
        panic!("hello is an action");
    };
    let param = &action.params()[0];
    let universe = param
        .source
        .candidates(action, param, "Jo")
        .map(|candidate| candidate.value)
        .collect::<Vec<_>>();
    assert_eq!(universe, vec!["Mark", "John", "William"]);

    assert_eq!(completer.complete("hello Jo", 8).values(), vec!["John"]);
}

#[test]
fn parameter_slots_past_the_declared_list_complete_nothing() {
    let completer = engine();
    assert_eq!(completer.complete("remote remove ", 14).values(), vec!["origin", "upstream"]);
    assert!(completer.complete("remote remove origin ", 21).is_empty());
}

#[test]
fn candidate_values_are_escape_encoded() {
    let buffer = "greet Stephen\\ B";
    let response = engine().complete(buffer, buffer.len());
    assert_eq!(response.values(), vec!["Stephen\\ Bunn"]);
    assert_eq!(response.candidates[0].display, DisplayText::from("Stephen Bunn"));
    assert_eq!((response.start, response.end), (6, buffer.len()));

    let config = CompleterConfig::from_toml_str("encode_completions = false\n").expect("config");
    let response = engine_with(config).complete(buffer, buffer.len());
    assert_eq!(response.values(), vec!["Stephen Bunn"]);
}

#[test]
fn value_and_completer_sources_pass_through_unfiltered() {
    let mut completer = ActionCompleter::default();
    let root = completer.root();
    completer
        .register_action(
            root,
            "pin",
            vec![ActionParam::new("tag").source(ParamSource::Value("latest".to_string()))],
            ok,
            ActionOptions::new(),
        )
        .expect("pin");
    completer
        .register_action(
            root,
            "save",
            vec![ActionParam::new("file")
                .source(ParamSource::completer(|partial: &str| {
                    vec![
                        SubCompletion::new(format!("{partial}.txt")).with_style("fg:green"),
                        SubCompletion::new(format!("{partial}.md")),
                    ]
                }))
                .style("fg:blue")
                .display_meta("file {completion}")],
            ok,
            ActionOptions::new(),
        )
        .expect("save");

    assert_eq!(completer.complete("pin zzz", 7).values(), vec!["latest"]);

    let response = completer.complete("save notes", 10);
    assert_eq!(response.values(), vec!["notes.txt", "notes.md"]);
    assert_eq!(response.candidates[0].style, "fg:green");
    assert_eq!(response.candidates[1].style, "fg:blue");
    assert_eq!(
        response.candidates[0].display_meta,
        Some(DisplayText::from("file notes.txt"))
    );
}

#[test]
fn dynamic_sources_see_the_action_and_current_value() {
    let mut completer = ActionCompleter::default();
    let root = completer.root();
    completer
        .register_action(
            root,
            "branch",
            vec![ActionParam::new("name").source(ParamSource::dynamic(|action, _, current| {
                vec!["main".to_string(), format!("{}/{current}", action.name())]
            }))],
            ok,
            ActionOptions::new(),
        )
        .expect("branch");
    assert_eq!(completer.complete("branch ", 7).values(), vec!["main", "branch/"]);
    assert_eq!(
        completer.complete("branch mai", 10).values(),
        vec!["branch/mai", "main"]
    );
}

#[test]
fn inactive_groups_are_invisible_to_completion_and_resolution() {
    let enabled = Rc::new(Cell::new(false));
    let flag = Rc::clone(&enabled);
    let mut completer = ActionCompleter::default();
    let root = completer.root();
    let admin = completer
        .register_group(root, "admin", GroupOptions::new().active(move || flag.get()))
        .expect("admin");
    completer
        .register_action(admin, "users", Vec::new(), ok, ActionOptions::new())
        .expect("users");
    completer
        .register_action(root, "help", Vec::new(), ok, ActionOptions::new())
        .expect("help");

    for buffer in ["", "adm", "admin", "admin "] {
        let response = completer.complete(buffer, buffer.len());
        assert!(!response.values().contains(&"admin"), "buffer {buffer:?}");
        assert!(!response.values().contains(&"users"), "buffer {buffer:?}");
    }
    let tokenized = tokenize("admin users");
    let resolution = completer.resolve(tokenized.words());
    assert_eq!(resolution.node, completer.root().node());
    assert!(resolution.consumed.is_empty());

    enabled.set(true);
    assert_eq!(completer.complete("admin ", 6).values(), vec!["users"]);
    let resolution = completer.resolve(tokenized.words());
    assert_eq!(completer.tree().path(resolution.node).display(), "admin users");
}

#[test]
fn inactive_actions_are_excluded_like_groups() {
    let mut completer = ActionCompleter::default();
    let root = completer.root();
    completer
        .register_action(root, "deploy", Vec::new(), ok, ActionOptions::new().active(|| false))
        .expect("deploy");
    completer
        .register_action(root, "status", Vec::new(), ok, ActionOptions::new())
        .expect("status");
    assert_eq!(completer.complete("", 0).values(), vec!["status"]);
    assert!(!completer.validate("deploy").is_valid());
}

#[test]
fn exact_names_win_over_equally_scored_siblings() {
    let mut completer = ActionCompleter::default();
    let root = completer.root();
    completer
        .register_action(root, "Stat", Vec::new(), ok, ActionOptions::new())
        .expect("Stat");
    completer
        .register_action(root, "stat", Vec::new(), ok, ActionOptions::new())
        .expect("stat");
    let tokenized = tokenize("stat ");
    let resolution = completer.resolve(tokenized.committed());
    assert_eq!(completer.tree().path(resolution.node).display(), "stat");
    assert_eq!(resolution.last_match, Some(MatchKind::Exact));
    assert!(completer.validate("stat").is_valid());
}

#[test]
fn nested_paths_descend_one_fragment_per_level() {
    let mut completer = ActionCompleter::default();
    let root = completer.root();
    let grp = completer.register_group(root, "grp", GroupOptions::new()).expect("grp");
    let sub = completer.register_group(grp, "sub", GroupOptions::new()).expect("sub");
    completer
        .register_action(sub, "act", vec![ActionParam::new("p")], ok, ActionOptions::new())
        .expect("act");

    let tokenized = tokenize("grp sub act p1");
    let resolution = completer.resolve(tokenized.words());
    assert_eq!(completer.tree().path(resolution.node).display(), "grp sub act");
    assert_eq!(resolution.consumed.len(), 3);
    assert_eq!(
        resolution
            .remaining
            .iter()
            .map(|fragment| fragment.text.as_str())
            .collect::<Vec<_>>(),
        vec!["p1"]
    );
}

#[test]
fn re_registration_keeps_sibling_order() {
    let mut completer = engine();
    let root = completer.root();
    completer
        .register_group(root, "remote", GroupOptions::new())
        .expect("replace remote");
    assert_eq!(completer.complete("", 0).values(), vec!["remote", "hello", "greet"]);
    assert!(completer.complete("remote ", 7).is_empty());
}

#[test]
fn path_completer_lists_directory_entries() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join("docs")).expect("docs");
    fs::write(dir.path().join("deploy.sh"), "").expect("deploy");

    let mut completer = ActionCompleter::default();
    let root = completer.root();
    completer
        .register_action(
            root,
            "open",
            vec![ActionParam::new("path")
                .source(ParamSource::completer(PathCompleter::new().with_base(dir.path())))],
            ok,
            ActionOptions::new(),
        )
        .expect("open");

    let response = completer.complete("open do", 7);
    assert_eq!(response.values(), vec!["docs"]);
    assert_eq!(response.candidates[0].display, DisplayText::from("docs/"));
}
