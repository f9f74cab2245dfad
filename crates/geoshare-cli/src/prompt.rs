//! Yes/no questions on stdin for permission gates.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

/// A user's reply to a connection prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Answer {
    Yes,
    No,
    /// Yes, and don't ask again.
    Always,
    /// No, and don't ask again.
    Never,
}

impl Answer {
    pub(crate) fn parse(reply: &str) -> Self {
        match reply.trim().to_ascii_lowercase().as_str() {
            "y" | "yes" => Self::Yes,
            "a" | "always" => Self::Always,
            "never" => Self::Never,
            _ => Self::No,
        }
    }

    pub(crate) fn is_yes(self) -> bool {
        matches!(self, Self::Yes | Self::Always)
    }

    pub(crate) fn remember(self) -> bool {
        matches!(self, Self::Always | Self::Never)
    }
}

/// Asks `question` on stderr and reads one line from stdin.
///
/// Returns `None` when cancelled. A closed stdin answers [`Answer::No`].
///
/// # Errors
///
/// Returns an error if stdin or stderr can't be accessed.
pub(crate) async fn ask(
    question: &str,
    choices: &str,
    cancel: &CancellationToken,
) -> anyhow::Result<Option<Answer>> {
    let mut stderr = tokio::io::stderr();
    stderr
        .write_all(format!("{question} {choices} ").as_bytes())
        .await?;
    stderr.flush().await?;

    read_answer(BufReader::new(tokio::io::stdin()), cancel).await
}

pub(crate) async fn read_answer<R>(
    mut reader: R,
    cancel: &CancellationToken,
) -> anyhow::Result<Option<Answer>>
where
    R: AsyncBufRead + Unpin,
{
    let mut line = String::new();
    let read = tokio::select! {
        biased;
        () = cancel.cancelled() => return Ok(None),
        read = reader.read_line(&mut line) => read?,
    };
    if read == 0 {
        tracing::debug!("stdin closed at prompt, treating as no");
        return Ok(Some(Answer::No));
    }
    Ok(Some(Answer::parse(&line)))
}
