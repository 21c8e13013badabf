// #![warn(
//     clippy::all,
//     clippy::pedantic,
// )]
// #![allow(clippy::must_use_candidate)]

pub mod bshare;
pub mod io;
pub mod numerical;
