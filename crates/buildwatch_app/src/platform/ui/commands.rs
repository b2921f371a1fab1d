use anyhow::bail;
use buildwatch_core::{Msg, NodePath};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Dispatch(Msg),
    ShowDashboard,
    Help,
    Quit,
}

pub(crate) const HELP: &str = "\
commands:
  toggle <build id>     select or deselect one build
  node <A/B/C>          select or clear every build under a project
  all | none            select every build | clear the selection
  search <term>         filter the tree by build name
  clear                 drop the search filter
  expand <A/B>          expand or collapse a project
  expand-all            expand every project
  collapse-all          collapse every project
  dashboard             show the selected builds by project
  reload                fetch builds and selection again
  quit";

pub(crate) fn parse(line: &str) -> anyhow::Result<Command> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let msg = match word {
        "" => Msg::NoOp,
        "toggle" => Msg::ToggleBuild(argument(word, rest)?.to_string()),
        "node" => Msg::ToggleNode(NodePath::parse(argument(word, rest)?)),
        "expand" => Msg::ToggleExpanded(NodePath::parse(argument(word, rest)?)),
        "all" => Msg::SelectAll,
        "none" => Msg::DeselectAll,
        "search" => Msg::SearchChanged(rest.to_string()),
        "clear" => Msg::SearchChanged(String::new()),
        "expand-all" => Msg::ExpandAll,
        "collapse-all" => Msg::CollapseAll,
        "reload" => Msg::ReloadRequested,
        "dashboard" => return Ok(Command::ShowDashboard),
        "help" | "?" => return Ok(Command::Help),
        "quit" | "exit" => return Ok(Command::Quit),
        other => bail!("unknown command `{other}`, try `help`"),
    };
    Ok(Command::Dispatch(msg))
}

fn argument<'a>(word: &str, rest: &'a str) -> anyhow::Result<&'a str> {
    if rest.is_empty() {
        bail!("`{word}` needs an argument");
    }
    Ok(rest)
}
