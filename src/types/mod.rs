// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Resource coordinates and the typed views derived from generic objects.

pub mod coordinate;
pub mod view;

pub use coordinate::{KindKey, ResourceCoordinate, ResourceScope};
pub use view::{into_view, ResourceList, ResourceView, TypedResource};
