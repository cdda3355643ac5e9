// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod loans;
pub mod payments;
pub mod reports;
pub mod exporter;
pub mod doctor;
