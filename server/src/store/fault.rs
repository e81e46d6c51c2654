// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{StoreError, StoreResult};

/// Switches that make a store fail its next calls, simulating a broken
/// transport.
#[derive(Debug, Default)]
pub struct FaultInjector {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl FaultInjector {
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn check_read(&self, what: &str) -> StoreResult<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Load(format!("{what}: simulated read failure")));
        }
        Ok(())
    }

    pub fn check_write(&self, what: &str) -> StoreResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Load(format!("{what}: simulated write failure")));
        }
        Ok(())
    }
}
