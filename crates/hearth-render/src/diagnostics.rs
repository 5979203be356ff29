// SPDX-License-Identifier: CEPL-1.0
//! Backend-emitted diagnostics (validation output and friends).
//!
//! A backend translates its own severity and category flags into [`Severity`]
//! and [`MessageKind`] and hands the text to a [`DiagnosticSink`]. Sinks may be
//! called from driver threads, hence `Send + Sync`.

use bitflags::bitflags;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Verbose,
    Info,
    Warning,
    Error,
}

bitflags! {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct MessageKind: u32 {
        const GENERAL = 1 << 0;
        const VALIDATION = 1 << 1;
        const PERFORMANCE = 1 << 2;
        const DEVICE_ADDRESS_BINDING = 1 << 3;
    }
}

pub trait DiagnosticSink: Send + Sync {
    fn emit(&self, severity: Severity, kind: MessageKind, message: &str);
}

/// Routes diagnostics into `tracing` at the matching level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn emit(&self, severity: Severity, kind: MessageKind, message: &str) {
        match severity {
            Severity::Verbose => tracing::trace!(?kind, "[Vulkan] {message}"),
            Severity::Info => tracing::info!(?kind, "[Vulkan] {message}"),
            Severity::Warning => tracing::warn!(?kind, "[Vulkan] {message}"),
            Severity::Error => tracing::error!(?kind, "[Vulkan] {message}"),
        }
    }
}

impl<F> DiagnosticSink for F
where
    F: Fn(Severity, MessageKind, &str) + Send + Sync,
{
    fn emit(&self, severity: Severity, kind: MessageKind, message: &str) {
        self(severity, kind, message)
    }
}
