// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

pub mod build;
pub mod config;
pub mod date;

pub use build::build_command;
pub use config::config_command;
pub use date::{DateRequest, date_command};
