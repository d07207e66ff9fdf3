use crate::github::{Issue, PullRequestNumber, Repository};

#[derive(Debug)]
pub enum ReviewEvent {
    /// A comment was posted on an issue or a pull request.
    IssueComment(IssueComment),
    /// A pull request was opened, updated, closed, etc.
    PullRequest(PullRequestEvent),
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueComment {
    pub issue_number: PullRequestNumber,
    pub body: String,
    /// `true` if the commented issue is a pull request.
    pub is_pull_request: bool,
    pub repository: Repository,
}

impl IssueComment {
    pub fn issue(&self) -> Issue {
        Issue {
            number: self.issue_number,
            repository: self.repository.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PullRequestEvent {
    pub issue_number: PullRequestNumber,
    pub action: String,
    pub repository: Repository,
}

impl PullRequestEvent {
    pub fn issue(&self) -> Issue {
        Issue {
            number: self.issue_number,
            repository: self.repository.clone(),
        }
    }

    /// Only newly opened and pushed-to pull requests can gain fixup commits.
    pub fn may_add_commits(&self) -> bool {
        matches!(self.action.as_str(), "opened" | "synchronize")
    }
}
