use serde_json::{Map, Value};
use std::borrow::Borrow;
use std::collections::HashSet;
use std::convert::Infallible;
use std::hash::Hash;

// ============================================================================
// Visitor protocol
// ============================================================================

/// Which children of a rewritten container are left alone.
#[derive(Debug, Clone, Default)]
pub enum Stop<K> {
    #[default]
    Descend,
    /// Keep every child verbatim.
    Halt,
    /// Keep the listed keys (or indices) verbatim.
    Skip(HashSet<K>),
}

impl<K: Eq + Hash> Stop<K> {
    pub fn skips<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + ?Sized,
    {
        match self {
            Stop::Descend => false,
            Stop::Halt => true,
            Stop::Skip(keys) => keys.contains(key),
        }
    }
}

/// Context handed to the children of a container.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Children<C> {
    /// Children see the container's own context.
    #[default]
    Inherit,
    /// Every child sees the same context.
    Broadcast(C),
    /// Child `i` sees entry `i`. Only honoured when the list is as long as
    /// the container was before rewriting; otherwise children inherit.
    Positional(Vec<C>),
}

impl<C> Children<C> {
    fn for_child<'a>(&'a self, index: usize, original_len: usize, parent: &'a C) -> &'a C {
        match self {
            Children::Inherit => parent,
            Children::Broadcast(ctx) => ctx,
            Children::Positional(ctxs) if ctxs.len() == original_len => {
                ctxs.get(index).unwrap_or(parent)
            }
            Children::Positional(_) => parent,
        }
    }
}

/// A rewritten container plus descent instructions.
#[derive(Debug, Clone)]
pub struct Step<N, K, C> {
    pub node: N,
    pub stop: Stop<K>,
    pub children: Children<C>,
}

pub type MappingStep<C> = Step<Map<String, Value>, String, C>;
pub type SequenceStep<C> = Step<Vec<Value>, usize, C>;

impl<N, K, C> Step<N, K, C> {
    pub fn descend(node: N) -> Self {
        Self {
            node,
            stop: Stop::Descend,
            children: Children::Inherit,
        }
    }

    pub fn halt(node: N) -> Self {
        Self {
            node,
            stop: Stop::Halt,
            children: Children::Inherit,
        }
    }

    pub fn with_stop(mut self, stop: Stop<K>) -> Self {
        self.stop = stop;
        self
    }

    pub fn with_children(mut self, children: Children<C>) -> Self {
        self.children = children;
        self
    }
}

/// Callbacks of a tree rewrite. Every method defaults to the identity.
pub trait NodeVisitor {
    type Context: Clone;
    type Error;

    fn visit_mapping(
        &mut self,
        map: Map<String, Value>,
        _ctx: &Self::Context,
    ) -> Result<MappingStep<Self::Context>, Self::Error> {
        Ok(Step::descend(map))
    }

    fn visit_sequence(
        &mut self,
        seq: Vec<Value>,
        _ctx: &Self::Context,
    ) -> Result<SequenceStep<Self::Context>, Self::Error> {
        Ok(Step::descend(seq))
    }

    fn visit_scalar(&mut self, s: String, _ctx: &Self::Context) -> Result<String, Self::Error> {
        Ok(s)
    }
}

/// Visitor that changes nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl NodeVisitor for Identity {
    type Context = ();
    type Error = Infallible;
}

/// Rewrites every string with a closure.
pub struct ScalarFn<F>(pub F);

impl<F: FnMut(String) -> String> NodeVisitor for ScalarFn<F> {
    type Context = ();
    type Error = Infallible;

    fn visit_scalar(&mut self, s: String, _ctx: &()) -> Result<String, Infallible> {
        Ok((self.0)(s))
    }
}

// ============================================================================
// Walk
// ============================================================================

/// Rewrite `node` bottom-up through `visitor`. Numbers, booleans and null are
/// returned unchanged.
pub fn transform<V>(visitor: &mut V, node: Value, ctx: &V::Context) -> Result<Value, V::Error>
where
    V: NodeVisitor + ?Sized,
{
    match node {
        Value::Object(map) => walk_mapping(visitor, map, ctx).map(Value::Object),
        Value::Array(seq) => walk_sequence(visitor, seq, ctx).map(Value::Array),
        Value::String(s) => visitor.visit_scalar(s, ctx).map(Value::String),
        literal => Ok(literal),
    }
}

fn walk_mapping<V>(
    visitor: &mut V,
    map: Map<String, Value>,
    ctx: &V::Context,
) -> Result<Map<String, Value>, V::Error>
where
    V: NodeVisitor + ?Sized,
{
    let original_len = map.len();
    let Step {
        node,
        stop,
        children,
    } = visitor.visit_mapping(map, ctx)?;
    if matches!(stop, Stop::Halt) {
        return Ok(node);
    }

    let mut out = Map::with_capacity(node.len());
    for (index, (key, value)) in node.into_iter().enumerate() {
        let value = if stop.skips(key.as_str()) {
            value
        } else {
            transform(visitor, value, children.for_child(index, original_len, ctx))?
        };
        out.insert(key, value);
    }
    Ok(out)
}

fn walk_sequence<V>(visitor: &mut V, seq: Vec<Value>, ctx: &V::Context) -> Result<Vec<Value>, V::Error>
where
    V: NodeVisitor + ?Sized,
{
    let original_len = seq.len();
    let Step {
        node,
        stop,
        children,
    } = visitor.visit_sequence(seq, ctx)?;
    if matches!(stop, Stop::Halt) {
        return Ok(node);
    }

    node.into_iter()
        .enumerate()
        .map(|(index, value)| {
            if stop.skips(&index) {
                Ok(value)
            } else {
                transform(visitor, value, children.for_child(index, original_len, ctx))
            }
        })
        .collect()
}
