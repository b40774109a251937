// crates/resilient-proxy-gen/src/generator.rs
// ============================================================================
// Module: Batch Proxy Generator
// Description: Generates, writes, and checks proxies for a whole assembly.
// Purpose: Drive introspection and synthesis with per-contract isolation.
// Dependencies: crate::*, resilient-proxy-core
// ============================================================================

//! ## Overview
//! [`ProxyGenerator`] binds assembly metadata, a target namespace, and a
//! [`Synthesizer`]. Batch operations visit contracts in declaration order; a
//! failing contract is reported through the event sink and recorded in the
//! [`BatchReport`] while its siblings still generate.
//!
//! Invariants:
//! - Generation is single-threaded and stateless between contracts.
//! - No file is written for a contract whose generation failed.
//! - Each output file name belongs to one contract per batch; later contracts
//!   that map to a claimed name fail with [`GenerateError::DuplicateOutput`].

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use resilient_proxy_core::Event;
use resilient_proxy_core::EventKind;
use resilient_proxy_core::EventSink;
use resilient_proxy_core::NoopSink;

use crate::error::GenerateError;
use crate::introspect::introspect;
use crate::metadata::AssemblyMetadata;
use crate::metadata::TypeMetadata;
use crate::output::check_output;
use crate::output::write_output;
use crate::synth::GeneratedUnit;
use crate::synth::Synthesizer;

// ============================================================================
// SECTION: Reports
// ============================================================================

/// Failure of one contract within a batch.
#[derive(Debug)]
pub struct ContractFailure {
    /// Namespace-qualified contract name.
    pub contract: String,
    /// Failure cause.
    pub error: GenerateError,
}

/// Generated units and failures of one batch.
#[derive(Debug, Default)]
pub struct GeneratedBatch {
    /// Successfully generated units in contract order.
    pub units: Vec<GeneratedUnit>,
    /// Contracts that failed to generate.
    pub failures: Vec<ContractFailure>,
}

/// Outcome of writing or checking a batch.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Output files written or verified, in contract order.
    pub outputs: Vec<PathBuf>,
    /// Contracts that failed.
    pub failures: Vec<ContractFailure>,
}

impl BatchReport {
    /// Returns true when no contract failed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

// ============================================================================
// SECTION: Generator
// ============================================================================

/// Batch generator for one assembly.
pub struct ProxyGenerator {
    /// Loaded assembly metadata.
    metadata: AssemblyMetadata,
    /// Target namespace of generated classes.
    namespace: String,
    /// Renderer.
    synthesizer: Synthesizer,
    /// Restricts batches to one contract when set.
    only: Option<String>,
    /// Receives per-contract outcomes.
    sink: Arc<dyn EventSink>,
}

impl std::fmt::Debug for ProxyGenerator {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ProxyGenerator")
            .field("assembly", &self.metadata.name)
            .field("namespace", &self.namespace)
            .field("only", &self.only)
            .finish_non_exhaustive()
    }
}

impl ProxyGenerator {
    /// Loads assembly metadata from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError`] when the metadata cannot be read or parsed.
    pub fn load(
        path: impl AsRef<Path>,
        namespace: impl Into<String>,
        synthesizer: Synthesizer,
    ) -> Result<Self, GenerateError> {
        let metadata = AssemblyMetadata::read(path.as_ref())?;
        Ok(Self::new(metadata, namespace, synthesizer))
    }

    /// Creates a generator over already loaded metadata.
    #[must_use]
    pub fn new(
        metadata: AssemblyMetadata,
        namespace: impl Into<String>,
        synthesizer: Synthesizer,
    ) -> Self {
        Self {
            metadata,
            namespace: namespace.into(),
            synthesizer,
            only: None,
            sink: Arc::new(NoopSink),
        }
    }

    /// Restricts batch operations to the named contract.
    #[must_use]
    pub fn only(mut self, contract: Option<String>) -> Self {
        self.only = contract;
        self
    }

    /// Overrides the event sink.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the loaded metadata.
    #[must_use]
    pub const fn metadata(&self) -> &AssemblyMetadata {
        &self.metadata
    }

    /// Returns the target namespace.
    #[must_use]
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Generates the contract with the given fully-qualified name.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::ContractNotFound`] for unknown names, or the
    /// introspection, naming, or synthesis error of the contract.
    pub fn generate_contract(&self, full_name: &str) -> Result<GeneratedUnit, GenerateError> {
        let contract = self
            .metadata
            .find(full_name)
            .ok_or_else(|| GenerateError::ContractNotFound(full_name.to_string()))?;
        self.generate_type(contract)
    }

    /// Generates every selected contract, isolating failures per contract.
    #[must_use]
    pub fn generate_all(&self) -> GeneratedBatch {
        let mut batch = GeneratedBatch::default();
        for (contract, outcome) in self.generate_selected() {
            match outcome {
                Ok(unit) => batch.units.push(unit),
                Err(error) => batch.failures.push(self.fail(contract, error)),
            }
        }
        batch
    }

    /// Writes one `<GeneratedName>.cs` file per selected contract.
    ///
    /// # Errors
    ///
    /// Returns [`GenerateError::Io`] only when `target_dir` cannot be
    /// created; per-contract failures are recorded in the report.
    pub fn write_all(&self, target_dir: &Path) -> Result<BatchReport, GenerateError> {
        std::fs::create_dir_all(target_dir).map_err(|err| GenerateError::Io(err.to_string()))?;
        let mut report = BatchReport::default();
        for (contract, outcome) in self.generate_selected() {
            let written = outcome
                .and_then(|unit| write_output(&target_dir.join(unit.file_name()), &unit.render()));
            match written {
                Ok(path) => {
                    self.sink.record(
                        &Event::info(
                            EventKind::ContractGenerated,
                            format!("generated {}", path.display()),
                        )
                        .with_contract(contract),
                    );
                    report.outputs.push(path);
                }
                Err(error) => report.failures.push(self.fail(contract, error)),
            }
        }
        self.finish("write", &report);
        Ok(report)
    }

    /// Verifies that on-disk outputs match freshly generated output.
    #[must_use]
    pub fn check_all(&self, target_dir: &Path) -> BatchReport {
        let mut report = BatchReport::default();
        for (contract, outcome) in self.generate_selected() {
            let checked = outcome
                .and_then(|unit| check_output(&target_dir.join(unit.file_name()), &unit.render()));
            match checked {
                Ok(path) => report.outputs.push(path),
                Err(error @ GenerateError::Drift { .. }) => {
                    self.sink.record(
                        &Event::error(EventKind::DriftDetected, error.to_string())
                            .with_contract(contract.clone()),
                    );
                    report.failures.push(ContractFailure {
                        contract,
                        error,
                    });
                }
                Err(error) => report.failures.push(self.fail(contract, error)),
            }
        }
        self.finish("check", &report);
        report
    }

    /// Generates the selected contracts, pairing each with its name.
    fn generate_selected(&self) -> Vec<(String, Result<GeneratedUnit, GenerateError>)> {
        let outcomes = match &self.only {
            Some(name) => vec![(name.clone(), self.generate_contract(name))],
            None => self
                .metadata
                .contracts()
                .map(|contract| (contract.full_name(), self.generate_type(contract)))
                .collect(),
        };
        // Keys are case-folded so outputs stay distinct on case-insensitive filesystems.
        let mut claimed: BTreeMap<String, String> = BTreeMap::new();
        outcomes
            .into_iter()
            .map(|(contract, outcome)| {
                let outcome = outcome.and_then(|unit| {
                    let file = unit.file_name();
                    match claimed.entry(file.to_lowercase()) {
                        Entry::Vacant(slot) => {
                            slot.insert(contract.clone());
                            Ok(unit)
                        }
                        Entry::Occupied(slot) => Err(GenerateError::DuplicateOutput {
                            file,
                            first: slot.get().clone(),
                            second: contract.clone(),
                        }),
                    }
                });
                (contract, outcome)
            })
            .collect()
    }

    /// Introspects and synthesizes one type.
    fn generate_type(&self, contract: &TypeMetadata) -> Result<GeneratedUnit, GenerateError> {
        let descriptor = introspect(contract)?;
        self.synthesizer.synthesize(&self.namespace, &descriptor)
    }

    /// Reports a contract failure and builds its record.
    fn fail(&self, contract: String, error: GenerateError) -> ContractFailure {
        self.sink.record(
            &Event::error(EventKind::ContractFailed, error.to_string())
                .with_contract(contract.clone()),
        );
        ContractFailure {
            contract,
            error,
        }
    }

    /// Reports the end of a batch.
    fn finish(&self, operation: &str, report: &BatchReport) {
        self.sink.record(&Event::info(
            EventKind::BatchCompleted,
            format!(
                "{operation} finished: {} succeeded, {} failed",
                report.outputs.len(),
                report.failures.len()
            ),
        ));
    }
}
