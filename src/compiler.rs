//! Compilation service for user-defined routines.
//!
//! A [`FunctionRegistry`] keeps the source text of every routine and compiles
//! it on first use through a [`SourceCompiler`]. Changing any source drops
//! every compiled routine, since one routine may be built on another.

use crate::access::{DataType, Value};
use crate::expression::{Callable, Expression, FunctionCall};
use anyhow::{anyhow, bail, Result};
use dashmap::DashMap;
use log::{debug, info};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use thiserror::Error;

/// Errors raised while looking up or compiling a routine
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("Function {name} is not defined")]
    UnknownFunction { name: String },

    /// The compiler rejected the source text
    #[error("Compiling {name} failed: {message}")]
    Diagnostic { name: String, message: String },

    #[error("Function {name} takes {expected} arguments, {actual} given")]
    ArgumentCount {
        name: String,
        expected: usize,
        actual: usize,
    },
}

/// Declared shape of a routine
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSignature {
    pub name: String,
    pub arg_types: Vec<DataType>,
    pub return_type: Option<DataType>,
    pub deterministic: bool,
}

impl FunctionSignature {
    pub fn new(name: impl Into<String>, arg_types: Vec<DataType>, return_type: Option<DataType>) -> Self {
        Self {
            name: name.into(),
            arg_types,
            return_type,
            deterministic: true,
        }
    }

    pub fn non_deterministic(mut self) -> Self {
        self.deterministic = false;
        self
    }
}

/// Turns source text into something callable
pub trait SourceCompiler: Send + Sync {
    fn compile(&self, signature: &FunctionSignature, source: &str) -> Result<Callable>;
}

struct SourceEntry {
    signature: FunctionSignature,
    source: String,
}

pub struct FunctionRegistry {
    compiler: Box<dyn SourceCompiler>,
    sources: DashMap<String, SourceEntry>,
    /// Compiled routines, tagged with the source generation they were built from
    compiled: DashMap<String, (u64, Callable)>,
    /// Bumped on every source change; older compiled entries are stale
    generation: AtomicU64,
}

impl FunctionRegistry {
    pub fn new(compiler: Box<dyn SourceCompiler>) -> Self {
        Self {
            compiler,
            sources: DashMap::new(),
            compiled: DashMap::new(),
            generation: AtomicU64::new(0),
        }
    }

    /// Process-wide registry backed by [`BuiltinCompiler`]
    pub fn global() -> &'static FunctionRegistry {
        static GLOBAL: OnceLock<FunctionRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| FunctionRegistry::new(Box::new(BuiltinCompiler)))
    }

    /// Define or replace a routine; every compiled routine is discarded
    pub fn set_source(&self, signature: FunctionSignature, source: impl Into<String>) {
        let key = signature.name.to_uppercase();
        info!("source of {} changed, dropping {} compiled routines", key, self.compiled.len());
        self.sources.insert(
            key,
            SourceEntry {
                signature,
                source: source.into(),
            },
        );
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.compiled.clear();
    }

    pub fn is_compiled(&self, name: &str) -> bool {
        self.current(&name.to_uppercase()).is_some()
    }

    /// A compiled routine built from the latest sources
    fn current(&self, key: &str) -> Option<Callable> {
        let generation = self.generation.load(Ordering::SeqCst);
        self.compiled
            .get(key)
            .filter(|e| e.value().0 == generation)
            .map(|e| Arc::clone(&e.value().1))
    }

    pub fn signature(&self, name: &str) -> Option<FunctionSignature> {
        self.sources
            .get(&name.to_uppercase())
            .map(|e| e.value().signature.clone())
    }

    /// The compiled routine, compiling it if needed
    pub fn get(&self, name: &str) -> Result<Callable, CompileError> {
        let key = name.to_uppercase();
        if let Some(callable) = self.current(&key) {
            return Ok(callable);
        }

        // read before the source, so a concurrent change marks this build stale
        let generation = self.generation.load(Ordering::SeqCst);
        let (signature, source) = self
            .sources
            .get(&key)
            .map(|e| (e.value().signature.clone(), e.value().source.clone()))
            .ok_or_else(|| CompileError::UnknownFunction { name: key.clone() })?;

        debug!("compiling {}", key);
        let callable = self
            .compiler
            .compile(&signature, &source)
            .map_err(|err| CompileError::Diagnostic {
                name: key.clone(),
                message: format!("{:#}", err),
            })?;
        self.compiled.insert(key, (generation, Arc::clone(&callable)));
        Ok(callable)
    }

    /// Build a call expression of the routine `name`
    pub fn call(&self, name: &str, args: Vec<Expression>) -> Result<Expression, CompileError> {
        let signature = self.signature(name).ok_or_else(|| CompileError::UnknownFunction {
            name: name.to_uppercase(),
        })?;
        if signature.arg_types.len() != args.len() {
            return Err(CompileError::ArgumentCount {
                name: signature.name,
                expected: signature.arg_types.len(),
                actual: args.len(),
            });
        }
        let callable = self.get(name)?;
        Ok(Expression::Function(FunctionCall::new(
            signature.name.to_uppercase(),
            args,
            callable,
            signature.deterministic,
            signature.return_type,
        )))
    }
}

/// Compiles source text naming one of the native routines
/// `abs`, `upper`, `lower` or `length`
pub struct BuiltinCompiler;

impl SourceCompiler for BuiltinCompiler {
    fn compile(&self, signature: &FunctionSignature, source: &str) -> Result<Callable> {
        if signature.arg_types.len() != 1 {
            bail!(
                "{} must take exactly one argument, got {}",
                signature.name,
                signature.arg_types.len()
            );
        }
        let routine = source.trim().to_lowercase();
        let callable: Callable = match routine.as_str() {
            "abs" => Arc::new(abs),
            "upper" => Arc::new(upper),
            "lower" => Arc::new(lower),
            "length" => Arc::new(length),
            other => bail!("unknown routine '{}'", other),
        };
        Ok(callable)
    }
}

fn single(args: &[Value]) -> Result<&Value> {
    match args {
        [value] => Ok(value),
        _ => bail!("expected one argument, got {}", args.len()),
    }
}

fn abs(args: &[Value]) -> Result<Value> {
    match single(args)? {
        Value::Int32(v) => v
            .checked_abs()
            .map(Value::Int32)
            .ok_or_else(|| anyhow!("ABS overflow for {}", v)),
        Value::Int64(v) => v
            .checked_abs()
            .map(Value::Int64)
            .ok_or_else(|| anyhow!("ABS overflow for {}", v)),
        Value::Null => Ok(Value::Null),
        other => bail!("ABS expects a number, got {}", other.to_sql()),
    }
}

fn upper(args: &[Value]) -> Result<Value> {
    match single(args)? {
        Value::String(s) => Ok(Value::String(s.to_uppercase())),
        Value::Null => Ok(Value::Null),
        other => bail!("UPPER expects a string, got {}", other.to_sql()),
    }
}

fn lower(args: &[Value]) -> Result<Value> {
    match single(args)? {
        Value::String(s) => Ok(Value::String(s.to_lowercase())),
        Value::Null => Ok(Value::Null),
        other => bail!("LOWER expects a string, got {}", other.to_sql()),
    }
}

fn length(args: &[Value]) -> Result<Value> {
    match single(args)? {
        Value::String(s) => Ok(Value::Int64(s.chars().count() as i64)),
        Value::Null => Ok(Value::Null),
        other => bail!("LENGTH expects a string, got {}", other.to_sql()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::thread;

    /// Wraps the builtin compiler and counts compilations
    struct CountingCompiler {
        compiles: Arc<AtomicUsize>,
    }

    impl SourceCompiler for CountingCompiler {
        fn compile(&self, signature: &FunctionSignature, source: &str) -> Result<Callable> {
            self.compiles.fetch_add(1, Ordering::SeqCst);
            BuiltinCompiler.compile(signature, source)
        }
    }

    fn registry() -> (FunctionRegistry, Arc<AtomicUsize>) {
        let compiles = Arc::new(AtomicUsize::new(0));
        let registry = FunctionRegistry::new(Box::new(CountingCompiler {
            compiles: Arc::clone(&compiles),
        }));
        (registry, compiles)
    }

    #[test]
    fn test_compile_on_first_use() {
        let (registry, compiles) = registry();
        registry.set_source(
            FunctionSignature::new("my_abs", vec![DataType::Int32], Some(DataType::Int32)),
            "abs",
        );
        assert!(!registry.is_compiled("MY_ABS"));

        let f = registry.get("my_abs").unwrap();
        assert_eq!(f(&[Value::Int32(-3)]).unwrap(), Value::Int32(3));
        registry.get("MY_ABS").unwrap();
        assert_eq!(compiles.load(Ordering::SeqCst), 1);
        assert!(registry.is_compiled("my_abs"));
    }

    #[test]
    fn test_set_source_invalidates_everything() {
        let (registry, compiles) = registry();
        registry.set_source(FunctionSignature::new("A", vec![DataType::Varchar], None), "upper");
        registry.get("A").unwrap();

        registry.set_source(FunctionSignature::new("B", vec![DataType::Varchar], None), "lower");
        assert!(!registry.is_compiled("A"));
        registry.get("A").unwrap();
        assert_eq!(compiles.load(Ordering::SeqCst), 2);
    }

    /// Blocks while compiling `upper` until the test releases it
    struct GatedCompiler {
        started: parking_lot::Mutex<mpsc::Sender<()>>,
        release: parking_lot::Mutex<mpsc::Receiver<()>>,
    }

    impl SourceCompiler for GatedCompiler {
        fn compile(&self, signature: &FunctionSignature, source: &str) -> Result<Callable> {
            if source == "upper" {
                self.started.lock().send(())?;
                self.release.lock().recv()?;
            }
            BuiltinCompiler.compile(signature, source)
        }
    }

    #[test]
    fn test_source_change_during_compile() {
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let registry = FunctionRegistry::new(Box::new(GatedCompiler {
            started: parking_lot::Mutex::new(started_tx),
            release: parking_lot::Mutex::new(release_rx),
        }));
        let signature = FunctionSignature::new("F", vec![DataType::Varchar], Some(DataType::Varchar));
        registry.set_source(signature.clone(), "upper");

        thread::scope(|s| {
            let first = s.spawn(|| registry.get("F").is_ok());
            started_rx.recv().unwrap();
            registry.set_source(signature.clone(), "lower");
            release_tx.send(()).unwrap();
            assert!(first.join().unwrap());
        });

        assert!(!registry.is_compiled("F"));
        let f = registry.get("F").unwrap();
        assert_eq!(f(&[Value::from("AbC")]).unwrap(), Value::from("abc"));
        assert!(registry.is_compiled("F"));
    }

    #[test]
    fn test_errors() {
        let (registry, _) = registry();
        assert_eq!(
            registry.get("nope").err(),
            Some(CompileError::UnknownFunction {
                name: "NOPE".to_string()
            })
        );

        registry.set_source(FunctionSignature::new("BAD", vec![DataType::Int32], None), "sqrt");
        assert!(matches!(
            registry.get("BAD"),
            Err(CompileError::Diagnostic { message, .. }) if message.contains("sqrt")
        ));
        assert!(!registry.is_compiled("BAD"));

        registry.set_source(FunctionSignature::new("LEN", vec![DataType::Varchar], None), "length");
        assert!(matches!(
            registry.call("len", vec![]),
            Err(CompileError::ArgumentCount { expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn test_call_builds_expression() {
        let (registry, _) = registry();
        registry.set_source(
            FunctionSignature::new("len", vec![DataType::Varchar], Some(DataType::Int64)),
            "length",
        );
        let expr = registry.call("len", vec![Expression::literal("héllo")]).unwrap();
        assert_eq!(expr.to_sql(), "LEN('héllo')");
        assert_eq!(expr.data_type(), Some(DataType::Int64));

        let session = Session::default();
        let folded = expr.optimize(&session).unwrap();
        assert_eq!(folded.to_sql(), "5");
    }

    #[test]
    fn test_non_deterministic_is_not_folded() {
        let (registry, _) = registry();
        registry.set_source(
            FunctionSignature::new("up", vec![DataType::Varchar], None).non_deterministic(),
            "upper",
        );
        let expr = registry.call("up", vec![Expression::literal("a")]).unwrap();
        let session = Session::default();
        let optimized = expr.optimize(&session).unwrap();
        assert_eq!(optimized.to_sql(), "UP('a')");
        assert_eq!(optimized.evaluate(&session).unwrap(), Value::from("A"));
    }

    #[test]
    fn test_global_registry() {
        let registry = FunctionRegistry::global();
        registry.set_source(
            FunctionSignature::new("GLOBAL_LOWER", vec![DataType::Varchar], None),
            "lower",
        );
        let f = registry.get("global_lower").unwrap();
        assert_eq!(f(&[Value::from("AbC")]).unwrap(), Value::from("abc"));
        assert!(std::ptr::eq(registry, FunctionRegistry::global()));
    }
}
