//! Chart how the popularity rank of names changed decade by decade.
//!
//! A [`database::NameDatabase`] maps lowercase names to their
//! [`series::RankSeries`]. A [`chart::GraphSurface`] keeps the list of names on
//! display and, on every update, lays them out with [`chart::GraphLayout`]
//! and replays the resulting primitives onto a [`chart::Canvas`].

pub mod chart;
pub mod database;
pub mod error;
pub mod export;
pub mod fonts;
pub mod series;
pub mod theme;
