#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

use anyhow::Result;
use reedline::{Prompt, PromptHistorySearch, PromptHistorySearchStatus, Reedline, Signal};
use std::borrow::Cow;
use std::io::{BufRead, BufReader};
use yash::builtins;
use yash::lexer::Lexer;
use yash::parser::Parser;
use yash::shell::Shell;
use yash::terminal::TerminalControl;

/// Fixed prompt: the shell prints the literal `# ` on every read.
struct YashPrompt;

impl Prompt for YashPrompt {
    fn render_prompt_left(&self) -> Cow<str> {
        Cow::Borrowed("# ")
    }

    fn render_prompt_right(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_indicator(&self, _prompt_mode: reedline::PromptEditMode) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_multiline_indicator(&self) -> Cow<str> {
        Cow::Borrowed("")
    }

    fn render_prompt_history_search_indicator(
        &self,
        history_search: PromptHistorySearch,
    ) -> Cow<str> {
        let prefix = match history_search.status {
            PromptHistorySearchStatus::Passing => "",
            PromptHistorySearchStatus::Failing => "failing ",
        };

        Cow::Owned(format!(
            "({}reverse-search: {}) ",
            prefix, history_search.term
        ))
    }
}

fn main() -> Result<()> {
    env_logger::init();

    // The shell needs a process group of its own before it can take the
    // terminal; failure here is the one fatal startup error.
    let terminal = TerminalControl::acquire()?;
    yash::signal::install_shell_dispositions();

    let shell = Shell::new(terminal);
    if atty::is(atty::Stream::Stdin) {
        run_interactive(shell)
    } else {
        run_non_interactive(shell)
    }
}

/// One prompt-loop step past the read: built-in dispatch, otherwise
/// tokenize, parse and launch. Parse errors are a single stdout line and the
/// job is discarded; nothing propagates out.
fn execute_line(line: &str, shell: &mut Shell) {
    if line.is_empty() {
        return;
    }

    if builtins::dispatch(line, shell) {
        return;
    }

    let tokens = Lexer::tokenize(line);
    match Parser::new(tokens).parse() {
        Ok(spec) => {
            if let Err(e) = shell.run_job(spec, line.to_string()) {
                eprintln!("-yash: {e}");
            }
        }
        Err(e) => println!("-yash: {e}"),
    }
}

fn run_interactive(mut shell: Shell) -> Result<()> {
    let mut line_editor = Reedline::create();
    let prompt = YashPrompt;

    loop {
        // completed children are reaped and reported ahead of every read
        shell.drain();
        shell.notify_and_prune();

        let sig = line_editor.read_line(&prompt);

        match sig {
            Ok(Signal::Success(buffer)) => {
                execute_line(buffer.trim(), &mut shell);
            }
            Ok(Signal::CtrlC) => {
                // the shell itself ignores SIGINT; just abandon the line
                continue;
            }
            Ok(Signal::CtrlD) => break,
            Err(e) => {
                // EINTR happens when a signal lands during the read; retry
                if e.kind() == std::io::ErrorKind::Interrupted {
                    continue;
                }
                eprintln!("-yash: error reading line: {e}");
                break;
            }
        }
    }

    Ok(())
}

/// Same loop fed from a pipe or file instead of the line editor.
fn run_non_interactive(mut shell: Shell) -> Result<()> {
    let stdin = std::io::stdin();
    let reader = BufReader::new(stdin.lock());

    for line_result in reader.lines() {
        let line = match line_result {
            Ok(line) => line,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };

        shell.drain();
        shell.notify_and_prune();
        execute_line(line.trim(), &mut shell);
    }

    Ok(())
}
