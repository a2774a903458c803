mod expand;
mod seq;
mod show;

const USAGE: &'static str = "\
A simple utility for generating the dates of recurring events.

USAGE:
    recur <command> ...

COMMANDS:
    expand  Expand event templates into one event per occurrence
    seq     Generate the dates of a repeat rule
    show    Render events as rows, marking repeating events
";

pub fn run(p: &mut lexopt::Parser) -> anyhow::Result<()> {
    let cmd = crate::args::next_as_command(USAGE, p)?;
    log::debug!("running command `{cmd}`");
    match &*cmd {
        "expand" => expand::run(p),
        "seq" => seq::run(p),
        "show" => show::run(p),
        unk => anyhow::bail!("unrecognized command '{}'", unk),
    }
}
