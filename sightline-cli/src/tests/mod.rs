//! Shared test harness modules for the Sightline CLI.

use super::*;

mod helpers;
mod score_unit;
