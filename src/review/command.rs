//! Classification of PR comments into review commands.

/// Command recognized in a PR comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewCommand {
    /// Squash all fixup and squash commits of the PR.
    Squash,
    /// Mark the PR as peer reviewed.
    PeerReview,
    Unrecognized,
}

const SQUASH_COMMAND: &str = "!squash";
const THUMBS_UP_EMOJI: &str = ":+1:";
const PLUS_ONE: &str = "+1";

/// Maps a comment body to a command.
///
/// Only an exact `!squash` and comments starting with a thumbs up (`:+1:`, or a `+1` that is not
/// followed by another digit) are recognized. Everything else is inert.
pub fn classify(comment: &str) -> ReviewCommand {
    if comment == SQUASH_COMMAND {
        ReviewCommand::Squash
    } else if starts_with_plus_one(comment) {
        ReviewCommand::PeerReview
    } else {
        ReviewCommand::Unrecognized
    }
}

fn starts_with_plus_one(comment: &str) -> bool {
    if comment.starts_with(THUMBS_UP_EMOJI) {
        return true;
    }
    match comment.strip_prefix(PLUS_ONE) {
        Some(rest) => !rest.starts_with(|c: char| c.is_ascii_digit()),
        None => false,
    }
}
