//! Runs the generator over many classes.

use std::{
    io,
    sync::{
        atomic::{AtomicBool, AtomicUsize, Ordering},
        Arc,
    },
};

use fnv::FnvHashMap;
use javah_class_file::ClassFile;
use rayon::prelude::*;
use tracing::{debug, trace, warn};

use crate::{
    config::{ErrorPolicy, GeneratorConfig},
    descriptor::map_descriptor,
    error::{Error, Result},
    mangle::{mangle_class_name, mangle_field_name, MangledSymbol},
    model::{ClassInfo, MethodInfo},
    reader::read_class,
    render::{ConstantMacro, HeaderUnit, Prototype},
    select::select_native_methods,
};

/// Generates the header unit of one class.
///
/// Returns `Ok(None)` for a class without native methods unless
/// [`GeneratorConfig::emit_for_classes_with_no_natives`] is set.
pub fn analyze_class(class: &ClassInfo, config: &GeneratorConfig) -> Result<Option<HeaderUnit>> {
    let class_name = class.qualified_name.as_str();
    if !class.has_native_methods() && !config.emit_for_classes_with_no_natives {
        debug!(class = class_name, "no native methods, skipping");
        return Ok(None);
    }

    let abi = config.abi;
    let mut unit = HeaderUnit::new(class_name, mangle_class_name(class_name, abi));

    if config.emit_constants {
        unit.constants = class
            .constants
            .iter()
            .map(|constant| ConstantMacro {
                name: format!("{}_{}", unit.mangled_class, mangle_field_name(&constant.name, abi)),
                literal: constant.value.c_literal(),
            })
            .collect();
    }

    let mut prototypes = Vec::new();
    for group in select_native_methods(class) {
        let overloaded = group.is_overloaded();
        for (index, native) in group.overloads.iter().enumerate() {
            let method = native.method;
            let signature = map_descriptor(&method.descriptor, method.is_static)
                .map_err(|e| Error::descriptor(class_name, &method.name, &method.descriptor, e))?;
            let symbol = MangledSymbol::new(
                class_name,
                &method.name,
                &method.descriptor,
                overloaded.then_some(index),
                abi,
            );
            trace!(class = class_name, method = %method, %symbol, "mangled");
            prototypes.push((
                native.declaration_index,
                method,
                Prototype {
                    method_name: method.name.clone(),
                    descriptor: method.descriptor.clone(),
                    symbol,
                    signature,
                },
            ));
        }
    }
    prototypes.sort_by_key(|(declaration_index, ..)| *declaration_index);

    let mut linked: FnvHashMap<String, &MethodInfo> = FnvHashMap::default();
    for (_, method, prototype) in &prototypes {
        let symbol = prototype.symbol.full_name();
        if let Some(first) = linked.insert(symbol.clone(), *method) {
            return Err(Error::AmbiguousNativeSignature {
                class: class_name.to_string(),
                method: method.name.clone(),
                symbol,
                first: first.descriptor.clone(),
                second: method.descriptor.clone(),
            });
        }
    }

    unit.prototypes = prototypes.into_iter().map(|(_, _, prototype)| prototype).collect();
    debug!(
        class = class_name,
        prototypes = unit.prototypes.len(),
        constants = unit.constants.len(),
        "generated header"
    );
    Ok(Some(unit))
}

/// Reads `class_file` and generates its header unit.
pub fn analyze_class_file(class_file: &ClassFile, config: &GeneratorConfig) -> Result<Option<HeaderUnit>> {
    analyze_class(&read_class(class_file)?, config)
}

/// Turns a class identifier into the bytes of its class file.
pub trait ClassResolver: Sync {
    fn resolve(&self, class: &str) -> io::Result<Vec<u8>>;
}

impl<F> ClassResolver for F
where
    F: Fn(&str) -> io::Result<Vec<u8>> + Sync,
{
    fn resolve(&self, class: &str) -> io::Result<Vec<u8>> {
        self(class)
    }
}

/// Stops a running [`Pipeline`] from starting further classes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of a [`Pipeline::run`]. Every list is in input order.
#[derive(Debug, Default)]
pub struct Report {
    /// Generated headers.
    pub units: Vec<HeaderUnit>,
    /// Classes that needed no header.
    pub skipped: Vec<String>,
    /// Classes that failed, with [`ErrorPolicy::SkipAndReport`].
    pub failures: Vec<Error>,
    /// Classes never started because the run was stopped.
    pub cancelled: Vec<String>,
}

impl Report {
    /// Whether every requested class was handled without error.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.cancelled.is_empty()
    }
}

/// Resolves, reads and renders classes in parallel.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: GeneratorConfig,
    cancellation: CancellationToken,
}

impl Pipeline {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            config,
            cancellation: CancellationToken::new(),
        }
    }

    /// Uses an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// The token that cancels this pipeline.
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates headers for `classes`.
    ///
    /// With [`ErrorPolicy::FailFast`] the error of the first failing class in
    /// input order is returned; classes after it that had not started yet are
    /// not processed. With [`ErrorPolicy::SkipAndReport`] failures end up in
    /// the report.
    pub fn run<R: ClassResolver + ?Sized>(&self, resolver: &R, classes: &[String]) -> Result<Report> {
        let first_failure = AtomicUsize::new(usize::MAX);
        let fail_fast = self.config.error_policy == ErrorPolicy::FailFast;

        let process = |(index, class): (usize, &String)| -> Result<Option<HeaderUnit>> {
            if self.cancellation.is_cancelled() || index > first_failure.load(Ordering::SeqCst) {
                return Err(Error::Cancelled { class: class.clone() });
            }
            let result = self.process_one(resolver, class);
            if fail_fast && result.is_err() {
                first_failure.fetch_min(index, Ordering::SeqCst);
            }
            result
        };

        let results: Vec<Result<Option<HeaderUnit>>> = match self.thread_pool() {
            Some(pool) => pool.install(|| classes.par_iter().enumerate().map(process).collect()),
            None => classes.par_iter().enumerate().map(process).collect(),
        };

        let mut report = Report::default();
        for (class, result) in classes.iter().zip(results) {
            match result {
                Ok(Some(unit)) => report.units.push(unit),
                Ok(None) => report.skipped.push(class.clone()),
                Err(Error::Cancelled { class }) => report.cancelled.push(class),
                Err(error) if fail_fast => return Err(error),
                Err(error) => {
                    warn!(class = %class, %error, "skipping class");
                    report.failures.push(error);
                }
            }
        }
        Ok(report)
    }

    fn process_one<R: ClassResolver + ?Sized>(&self, resolver: &R, class: &str) -> Result<Option<HeaderUnit>> {
        debug!(class, "resolving");
        let bytes = resolver.resolve(class).map_err(|source| Error::Unresolved {
            class: class.to_string(),
            source,
        })?;
        let class_file = ClassFile::from_bytes(&bytes).map_err(|e| Error::decode(class, e))?;
        analyze_class_file(&class_file, &self.config)
    }

    fn thread_pool(&self) -> Option<rayon::ThreadPool> {
        let jobs = self.config.jobs?;
        match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
            Ok(pool) => Some(pool),
            Err(error) => {
                warn!(jobs, %error, "could not build thread pool, using the global one");
                None
            }
        }
    }
}
