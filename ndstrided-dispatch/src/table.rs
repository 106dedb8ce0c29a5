//! Dispatch tables.
//!
//! A [`DispatchTable`] is an ordered list of `(signature, kernel)` entries plus
//! an optional fallback kernel. It is assembled once through
//! [`DispatchTable::builder`] and is immutable afterwards, so one table can be
//! shared by any number of threads without locking. [`Dispatcher`] resolves the
//! runtime dtypes of a call against the table and runs the selected kernel.
//!
//! Resolution is an exact match, tried in insertion order; the first matching
//! entry wins. Without a match the fallback runs, and without a fallback the
//! call fails with [`StridedError::NoMatchingKernel`].

use std::fmt;
use std::sync::Arc;

use ndstrided_traits::DType;
use ndstrided_view::{DynView, DynViewMut, Result, StridedError};

use crate::signature::Signature;

/// Kernel entry point over runtime-typed views.
pub type KernelFn = dyn Fn(&[DynView<'_>], &mut DynViewMut<'_>) -> Result<()> + Send + Sync;

/// A named kernel implementation.
#[derive(Clone)]
pub struct Kernel {
    name: String,
    func: Arc<KernelFn>,
}

impl Kernel {
    pub fn new<F>(name: impl Into<String>, func: F) -> Self
    where
        F: Fn(&[DynView<'_>], &mut DynViewMut<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run the kernel directly, bypassing resolution.
    pub fn run(&self, inputs: &[DynView<'_>], output: &mut DynViewMut<'_>) -> Result<()> {
        (self.func)(inputs, output)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel").field("name", &self.name).finish()
    }
}

/// Which kernel a call resolved to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KernelId {
    /// Table entry at this index.
    Entry(usize),
    Fallback,
}

/// Immutable signature table.
#[derive(Clone, Debug)]
pub struct DispatchTable {
    arity: usize,
    entries: Vec<(Signature, Kernel)>,
    fallback: Option<Kernel>,
}

impl DispatchTable {
    /// Start a table for kernels taking `arity` inputs.
    pub fn builder(arity: usize) -> DispatchTableBuilder {
        DispatchTableBuilder {
            arity,
            entries: Vec::new(),
            fallback: None,
        }
    }

    /// Number of inputs every kernel takes.
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of entries, not counting the fallback.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn signatures(&self) -> impl Iterator<Item = &Signature> {
        self.entries.iter().map(|(sig, _)| sig)
    }

    pub fn fallback(&self) -> Option<&Kernel> {
        self.fallback.as_ref()
    }

    /// First entry matching exactly, else the fallback if there is one.
    pub fn lookup(&self, inputs: &[DType], output: DType) -> Option<KernelId> {
        self.entries
            .iter()
            .position(|(sig, _)| sig.matches(inputs, output))
            .map(KernelId::Entry)
            .or(self.fallback.as_ref().map(|_| KernelId::Fallback))
    }

    pub fn kernel(&self, id: KernelId) -> Option<&Kernel> {
        match id {
            KernelId::Entry(i) => self.entries.get(i).map(|(_, k)| k),
            KernelId::Fallback => self.fallback.as_ref(),
        }
    }
}

/// Collects entries for a [`DispatchTable`].
#[derive(Debug)]
pub struct DispatchTableBuilder {
    arity: usize,
    entries: Vec<(Signature, Kernel)>,
    fallback: Option<Kernel>,
}

impl DispatchTableBuilder {
    /// Append an entry. Fails if the signature does not take `arity` inputs.
    pub fn entry(mut self, signature: Signature, kernel: Kernel) -> Result<Self> {
        if signature.arity() != self.arity {
            return Err(StridedError::InvalidArgument(format!(
                "signature {signature} has {} inputs, table expects {}",
                signature.arity(),
                self.arity
            )));
        }
        self.entries.push((signature, kernel));
        Ok(self)
    }

    /// Set the kernel used when no entry matches.
    pub fn fallback(mut self, kernel: Kernel) -> Self {
        self.fallback = Some(kernel);
        self
    }

    pub fn build(self) -> DispatchTable {
        tracing::debug!(
            arity = self.arity,
            entries = self.entries.len(),
            fallback = self.fallback.as_ref().map(Kernel::name),
            "built dispatch table"
        );
        DispatchTable {
            arity: self.arity,
            entries: self.entries,
            fallback: self.fallback,
        }
    }
}

/// A named operation backed by a [`DispatchTable`].
#[derive(Clone, Debug)]
pub struct Dispatcher {
    name: String,
    table: DispatchTable,
}

impl Dispatcher {
    pub fn new(name: impl Into<String>, table: DispatchTable) -> Self {
        Self {
            name: name.into(),
            table,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &DispatchTable {
        &self.table
    }

    pub fn kernel(&self, id: KernelId) -> Option<&Kernel> {
        self.table.kernel(id)
    }

    /// Select the kernel for the given input and output dtypes without running it.
    pub fn resolve(&self, inputs: &[DType], output: DType) -> Result<KernelId> {
        if inputs.len() != self.table.arity {
            return Err(StridedError::InvalidArgument(format!(
                "`{}` takes {} inputs, got {}",
                self.name,
                self.table.arity,
                inputs.len()
            )));
        }
        match self.table.lookup(inputs, output) {
            Some(id) => {
                tracing::debug!(
                    op = %self.name,
                    signature = %Signature::new(inputs, output),
                    kernel = self.table.kernel(id).map(Kernel::name),
                    "dispatch resolved"
                );
                Ok(id)
            }
            None => Err(StridedError::NoMatchingKernel {
                signature: Signature::new(inputs, output).to_string(),
            }),
        }
    }

    /// [`Dispatcher::resolve`] from dtype names, inputs first and the output last.
    ///
    /// Unknown names fail with `UnrecognizedDataType`.
    pub fn resolve_names(&self, names: &[&str]) -> Result<KernelId> {
        let sig = Signature::from_names(names)?;
        self.resolve(sig.inputs(), sig.output())
    }

    /// Resolve on the dtypes of the views and run the selected kernel.
    pub fn call(&self, inputs: &[DynView<'_>], output: &mut DynViewMut<'_>) -> Result<KernelId> {
        let dtypes: Vec<DType> = inputs.iter().map(DynView::dtype).collect();
        let id = self.resolve(&dtypes, output.dtype())?;
        let kernel = self.table.kernel(id).ok_or_else(|| StridedError::NoMatchingKernel {
            signature: Signature::new(&dtypes, output.dtype()).to_string(),
        })?;
        kernel.run(inputs, output)?;
        Ok(id)
    }
}

/// Build a [`Dispatcher`] from ordered `(signature, kernel)` pairs and a fallback.
pub fn dispatch(
    name: impl Into<String>,
    arity: usize,
    entries: Vec<(Signature, Kernel)>,
    fallback: Kernel,
) -> Result<Dispatcher> {
    let mut builder = DispatchTable::builder(arity);
    for (sig, kernel) in entries {
        builder = builder.entry(sig, kernel)?;
    }
    Ok(Dispatcher::new(name, builder.fallback(fallback).build()))
}
