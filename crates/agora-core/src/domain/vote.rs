use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Direction of a vote cast on a post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl std::str::FromStr for VoteDirection {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            other => Err(DomainError::validation(format!(
                "unknown vote direction '{other}'"
            ))),
        }
    }
}

/// Vote counters together with the viewer's current vote.
///
/// The counters only move through [`VoteTally::cast`], so they always agree
/// with `user_vote`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteTally {
    pub upvotes: u32,
    pub downvotes: u32,
    pub user_vote: Option<VoteDirection>,
}

impl VoteTally {
    pub fn new(upvotes: u32, downvotes: u32) -> Self {
        Self {
            upvotes,
            downvotes,
            user_vote: None,
        }
    }

    /// Tally for freshly created content: the author upvotes their own work.
    pub fn authored() -> Self {
        Self {
            upvotes: 1,
            downvotes: 0,
            user_vote: Some(VoteDirection::Up),
        }
    }

    /// Net score, `upvotes - downvotes`.
    pub fn score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }

    /// Apply a vote request.
    ///
    /// Repeating the stored vote clears it; a different vote moves the
    /// viewer's count from one counter to the other.
    pub fn cast(&mut self, vote: VoteDirection) {
        let previous = self.user_vote.take();

        match previous {
            Some(VoteDirection::Up) => self.upvotes = self.upvotes.saturating_sub(1),
            Some(VoteDirection::Down) => self.downvotes = self.downvotes.saturating_sub(1),
            None => {}
        }

        if previous == Some(vote) {
            return;
        }

        match vote {
            VoteDirection::Up => self.upvotes += 1,
            VoteDirection::Down => self.downvotes += 1,
        }
        self.user_vote = Some(vote);
    }
}

/// Like counter with the viewer's like flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeState {
    pub likes: u32,
    pub liked: bool,
}

impl LikeState {
    pub fn toggle(&mut self) {
        if self.liked {
            self.likes = self.likes.saturating_sub(1);
            self.liked = false;
        } else {
            self.likes += 1;
            self.liked = true;
        }
    }
}

/// Anything that carries a vote tally and a like counter.
pub trait Votable {
    fn tally(&self) -> &VoteTally;
    fn tally_mut(&mut self) -> &mut VoteTally;
    fn like_state_mut(&mut self) -> &mut LikeState;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_down_vote_clears_it() {
        let mut tally = VoteTally::new(3, 0);

        tally.cast(VoteDirection::Down);
        assert_eq!(tally.user_vote, Some(VoteDirection::Down));
        assert_eq!((tally.upvotes, tally.downvotes), (3, 1));

        tally.cast(VoteDirection::Down);
        assert_eq!(tally.user_vote, None);
        assert_eq!((tally.upvotes, tally.downvotes), (3, 0));
    }

    #[test]
    fn double_up_vote_restores_counters() {
        let original = VoteTally::new(7, 2);
        let mut tally = original;

        tally.cast(VoteDirection::Up);
        tally.cast(VoteDirection::Up);

        assert_eq!(tally, original);
    }

    #[test]
    fn switching_vote_flips_both_counters() {
        let mut tally = VoteTally::authored();

        tally.cast(VoteDirection::Down);

        assert_eq!(tally.user_vote, Some(VoteDirection::Down));
        assert_eq!((tally.upvotes, tally.downvotes), (0, 1));
        assert_eq!(tally.score(), -1);
    }

    #[test]
    fn like_toggle_never_goes_negative() {
        let mut state = LikeState {
            likes: 0,
            liked: true,
        };
        state.toggle();
        assert_eq!(state, LikeState::default());

        state.toggle();
        assert_eq!(
            state,
            LikeState {
                likes: 1,
                liked: true
            }
        );
    }

    #[test]
    fn parses_vote_direction() {
        assert_eq!("up".parse::<VoteDirection>(), Ok(VoteDirection::Up));
        assert!("sideways".parse::<VoteDirection>().is_err());
    }
}
