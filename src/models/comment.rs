use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{CommentId, MovieId, UserId};

#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    pub id: CommentId,
    pub movie_id: MovieId,
    pub user_id: UserId,
    pub rating: i32,
    pub text: String,
    pub post_date: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewComment {
    pub movie_id: MovieId,
    pub rating: i32,
    pub text: String,
}

/// Comment aggregate for one movie.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RatingStats {
    pub count: i64,
    pub sum: i64,
}

impl RatingStats {
    /// Mean rating, `None` when there are no comments.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn average_is_none_without_comments() {
        assert_eq!(RatingStats::default().average(), None);
    }

    #[test]
    fn average_of_ratings() {
        let stats = RatingStats { count: 2, sum: 18 };
        assert_eq!(stats.average(), Some(9.0));

        let stats = RatingStats { count: 3, sum: 10 };
        let avg = stats.average().unwrap();
        assert!((avg - 10.0 / 3.0).abs() < f64::EPSILON);
    }
}
