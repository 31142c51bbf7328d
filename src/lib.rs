// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod api;
pub mod cli;
pub mod config;
pub mod csv_io;
pub mod dashboard;
pub mod db;
pub mod debt;
pub mod error;
pub mod forms;
pub mod invoice;
pub mod labels;
pub mod listing;
pub mod models;
pub mod money;
pub mod refresh;
pub mod transfer;
pub mod utils;
pub mod commands;
