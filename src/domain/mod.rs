//! Domain types for the movie catalog with strong typing.
//!
//! Identifiers follow the newtype pattern so a `MovieId` can never be passed
//! where a `UserId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(i32);

        impl $name {
            #[must_use]
            pub const fn new(id: i32) -> Self {
                debug_assert!(id >= 0, concat!(stringify!($name), " should be non-negative"));
                Self(id)
            }

            #[must_use]
            pub const fn value(&self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self::new(id)
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_i32(self.0)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let id = i32::deserialize(deserializer)?;
                Ok(Self::new(id))
            }
        }
    };
}

entity_id!(
    /// Unique identifier for a movie.
    ///
    /// ```rust
    /// use marquee::domain::MovieId;
    ///
    /// let id = MovieId::new(42);
    /// assert_eq!(id.value(), 42);
    /// assert_eq!(id.to_string(), "42");
    /// ```
    MovieId
);

entity_id!(
    /// Unique identifier for a registered user.
    UserId
);

entity_id!(
    /// Unique identifier for a comment.
    CommentId
);

/// Movie genre. Stored and transmitted by its variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Genre {
    Comedy,
    Crime,
    Documentary,
    Drama,
    Horror,
    Family,
    Romance,
    Scifi,
    Thriller,
}

impl Genre {
    pub const ALL: [Self; 9] = [
        Self::Comedy,
        Self::Crime,
        Self::Documentary,
        Self::Drama,
        Self::Horror,
        Self::Family,
        Self::Romance,
        Self::Scifi,
        Self::Thriller,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Comedy => "Comedy",
            Self::Crime => "Crime",
            Self::Documentary => "Documentary",
            Self::Drama => "Drama",
            Self::Horror => "Horror",
            Self::Family => "Family",
            Self::Romance => "Romance",
            Self::Scifi => "Scifi",
            Self::Thriller => "Thriller",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string does not name a [`Genre`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown genre '{0}', expected one of Comedy/Crime/Documentary/Drama/Horror/Family/Romance/Scifi/Thriller")]
pub struct UnknownGenre(pub String);

impl FromStr for Genre {
    type Err = UnknownGenre;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.as_str() == s)
            .ok_or_else(|| UnknownGenre(s.to_string()))
    }
}

/// Desired favorite relationship between a user and a movie.
///
/// On the wire this is the numeric path segment of
/// `POST /api/users/favorites/{movieId}/{status}`: `1` favors, `0` unfavors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FavoriteStatus {
    NotFavored,
    Favored,
}

impl FavoriteStatus {
    #[must_use]
    pub const fn from_flag(flag: i32) -> Option<Self> {
        match flag {
            0 => Some(Self::NotFavored),
            1 => Some(Self::Favored),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_favored(&self) -> bool {
        matches!(self, Self::Favored)
    }
}

/// Which movie image slot an upload targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovieImage {
    Poster,
    Background,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movie_id_conversions() {
        let id = MovieId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.to_string(), "42");
        assert_eq!(i32::from(id), 42);
        assert_eq!(MovieId::from(42), id);
    }

    #[test]
    fn ids_serialize_as_plain_integers() {
        let json = serde_json::to_string(&UserId::new(7)).unwrap();
        assert_eq!(json, "7");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, UserId::new(7));
    }

    #[test]
    fn genre_parses_exact_names_only() {
        assert_eq!("Scifi".parse::<Genre>(), Ok(Genre::Scifi));
        assert_eq!("Thriller".parse::<Genre>(), Ok(Genre::Thriller));
        assert!("scifi".parse::<Genre>().is_err());
        assert!("Western".parse::<Genre>().is_err());
        for genre in Genre::ALL {
            assert_eq!(genre.as_str().parse::<Genre>(), Ok(genre));
        }
    }

    #[test]
    fn favorite_status_flags() {
        assert_eq!(FavoriteStatus::from_flag(1), Some(FavoriteStatus::Favored));
        assert_eq!(FavoriteStatus::from_flag(0), Some(FavoriteStatus::NotFavored));
        assert_eq!(FavoriteStatus::from_flag(2), None);
        assert!(FavoriteStatus::Favored.is_favored());
        assert!(!FavoriteStatus::NotFavored.is_favored());
    }
}
