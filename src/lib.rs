// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod cluster;
pub mod config;
pub mod constants;
pub mod error;
pub mod gateway;
pub mod kubernetes;
pub mod resolver;
pub mod resources;
pub mod types;

#[cfg(test)]
pub mod test_utils;
