//! Render class descriptors and their composed layouts.
//!
//! A render class is a `static` [`RenderClass`] naming its bases, the render parameters
//! it declares and the render data fields it declares. The first time a class is used its
//! ancestry is linearized (C3) and the per-class parameter/data tables are composed into a
//! [`ClassLayout`], which is cached in a process-wide registry keyed by class name.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ptr;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::data::RenderData;
use crate::render::param::RenderParam;

/// Releases whatever the declaring class stored in a [`RenderData`].
pub type FinalizeHook = fn(&mut RenderData);

/// Static declaration of a render class.
///
/// Parameter tables hold owned defaults, so they live in their own `static` arrays.
///
/// ```
/// use tessera::{ParamValue, RenderClass, RenderParam, RENDERABLE};
///
/// static GLYPH_PARAMS: [RenderParam; 1] = [RenderParam::new("glyph", ParamValue::str("#"))];
///
/// static GLYPH: RenderClass = RenderClass::new("Glyph")
///     .with_bases(&[&RENDERABLE])
///     .with_params(&GLYPH_PARAMS);
///
/// let layout = GLYPH.layout().unwrap();
/// assert!(layout.is_subclass_of(&RENDERABLE));
/// ```
pub struct RenderClass {
    name: &'static str,
    bases: &'static [&'static RenderClass],
    params: &'static [RenderParam],
    data: &'static [&'static str],
    finalize: Option<FinalizeHook>,
}

impl RenderClass {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            bases: &[],
            params: &[],
            data: &[],
            finalize: None,
        }
    }

    /// Direct bases, most significant first.
    pub const fn with_bases(self, bases: &'static [&'static RenderClass]) -> Self {
        Self { bases, ..self }
    }

    /// Render parameters declared by this class, in positional order.
    pub const fn with_params(self, params: &'static [RenderParam]) -> Self {
        Self { params, ..self }
    }

    /// Render data fields declared by this class.
    pub const fn with_data(self, data: &'static [&'static str]) -> Self {
        Self { data, ..self }
    }

    pub const fn with_finalizer(self, hook: FinalizeHook) -> Self {
        Self {
            finalize: Some(hook),
            ..self
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn bases(&self) -> &'static [&'static RenderClass] {
        self.bases
    }

    pub fn own_params(&self) -> &'static [RenderParam] {
        self.params
    }

    pub fn own_data(&self) -> &'static [&'static str] {
        self.data
    }

    pub fn finalizer(&self) -> Option<FinalizeHook> {
        self.finalize
    }

    pub fn declares_params(&self) -> bool {
        !self.params.is_empty()
    }

    pub fn declares_data(&self) -> bool {
        !self.data.is_empty()
    }

    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params.iter().position(|p| p.name == name)
    }

    pub fn data_index(&self, name: &str) -> Option<usize> {
        self.data.iter().position(|f| *f == name)
    }

    /// Identity comparison.
    pub fn is(&self, other: &RenderClass) -> bool {
        ptr::eq(self, other)
    }

    /// Composed layout, registering the class (and its ancestry) on first use.
    pub fn layout(&'static self) -> TesseraResult<Arc<ClassLayout>> {
        let mut registry = REGISTRY.lock().unwrap_or_else(PoisonError::into_inner);
        let mut stack = Vec::new();
        register(&mut registry, self, &mut stack)
    }

    /// `true` if `self` is `other` or inherits from it.
    pub fn is_subclass_of(&'static self, other: &RenderClass) -> TesseraResult<bool> {
        Ok(self.layout()?.is_subclass_of(other))
    }
}

impl PartialEq for RenderClass {
    fn eq(&self, other: &Self) -> bool {
        self.is(other)
    }
}

impl Eq for RenderClass {}

impl Hash for RenderClass {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl fmt::Debug for RenderClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RenderClass({})", self.name)
    }
}

impl fmt::Display for RenderClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Composed view of a render class and its ancestry.
#[derive(Debug)]
pub struct ClassLayout {
    class: &'static RenderClass,
    mro: Vec<&'static RenderClass>,
    param_classes: Vec<&'static RenderClass>,
    data_classes: Vec<&'static RenderClass>,
    params: Vec<(&'static str, &'static RenderClass)>,
    data_owner: HashMap<&'static str, &'static RenderClass>,
}

impl ClassLayout {
    pub fn class(&self) -> &'static RenderClass {
        self.class
    }

    /// Linearized ancestry, starting with the class itself.
    pub fn mro(&self) -> &[&'static RenderClass] {
        &self.mro
    }

    pub fn is_subclass_of(&self, other: &RenderClass) -> bool {
        self.mro.iter().any(|c| c.is(other))
    }

    /// Classes in the ancestry that declare render parameters, in MRO order.
    pub fn param_classes(&self) -> &[&'static RenderClass] {
        &self.param_classes
    }

    /// Classes in the ancestry that declare render data fields, in MRO order.
    pub fn data_classes(&self) -> &[&'static RenderClass] {
        &self.data_classes
    }

    pub fn param_class_index(&self, class: &RenderClass) -> Option<usize> {
        self.param_classes.iter().position(|c| c.is(class))
    }

    pub fn data_class_index(&self, class: &RenderClass) -> Option<usize> {
        self.data_classes.iter().position(|c| c.is(class))
    }

    /// Composed parameter set: name and declaring class; descendants shadow ancestors.
    pub fn params(&self) -> impl Iterator<Item = (&'static str, &'static RenderClass)> + '_ {
        self.params.iter().copied()
    }

    /// Class whose declaration of `name` wins in the composed set.
    pub fn param_owner(&self, name: &str) -> Option<&'static RenderClass> {
        self.params
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, class)| *class)
    }

    pub fn data_owner(&self, name: &str) -> Option<&'static RenderClass> {
        self.data_owner.get(name).copied()
    }

    /// Ancestor (or the class itself) with the given name.
    pub fn find_class(&self, name: &str) -> Option<&'static RenderClass> {
        self.mro.iter().copied().find(|c| c.name == name)
    }

    fn mro_names(&self) -> Vec<&'static str> {
        self.mro.iter().map(|c| c.name).collect()
    }
}

static REGISTRY: LazyLock<Mutex<HashMap<&'static str, Arc<ClassLayout>>>> =
    LazyLock::new(Default::default);

fn register(
    registry: &mut HashMap<&'static str, Arc<ClassLayout>>,
    class: &'static RenderClass,
    stack: &mut Vec<&'static RenderClass>,
) -> TesseraResult<Arc<ClassLayout>> {
    if let Some(layout) = registry.get(class.name) {
        if layout.class.is(class) {
            return Ok(Arc::clone(layout));
        }
        return Err(TesseraError::class(format!(
            "render class name `{}` is already registered by another class",
            class.name
        )));
    }
    if stack.iter().any(|c| c.is(class)) {
        return Err(TesseraError::class(format!(
            "render class `{}` inherits from itself",
            class.name
        )));
    }

    stack.push(class);
    let bases = class
        .bases
        .iter()
        .map(|base| register(registry, base, stack))
        .collect::<TesseraResult<Vec<_>>>();
    stack.pop();

    let layout = Arc::new(build_layout(class, &bases?)?);
    tracing::debug!(class = class.name, mro = ?layout.mro_names(), "registered render class");
    registry.insert(class.name, Arc::clone(&layout));
    Ok(layout)
}

fn build_layout(
    class: &'static RenderClass,
    bases: &[Arc<ClassLayout>],
) -> TesseraResult<ClassLayout> {
    validate_declaration(class)?;

    let mro = linearize(class, bases)?;

    let mut params: Vec<(&'static str, &'static RenderClass)> = Vec::new();
    for c in &mro {
        for p in c.params {
            if !params.iter().any(|(name, _)| *name == p.name) {
                params.push((p.name, *c));
            }
        }
    }

    let mut data_owner: HashMap<&'static str, &'static RenderClass> = HashMap::new();
    for c in &mro {
        for field in c.data {
            if let Some(prev) = data_owner.get(field) {
                return Err(TesseraError::class(format!(
                    "render data field `{field}` of `{}` is already declared by `{}` in the hierarchy of `{}`",
                    c.name, prev.name, class.name
                )));
            }
            data_owner.insert(*field, *c);
        }
    }

    Ok(ClassLayout {
        class,
        param_classes: mro.iter().copied().filter(|c| c.declares_params()).collect(),
        data_classes: mro.iter().copied().filter(|c| c.declares_data()).collect(),
        mro,
        params,
        data_owner,
    })
}

fn validate_declaration(class: &'static RenderClass) -> TesseraResult<()> {
    for (i, base) in class.bases.iter().enumerate() {
        if class.bases[..i].iter().any(|b| b.is(base)) {
            return Err(TesseraError::class(format!(
                "`{}` lists base `{}` more than once",
                class.name, base.name
            )));
        }
    }
    for (i, p) in class.params.iter().enumerate() {
        if class.params[..i].iter().any(|q| q.name == p.name) {
            return Err(TesseraError::class(format!(
                "`{}` declares render param `{}` more than once",
                class.name, p.name
            )));
        }
        p.check(class.name, &p.default).map_err(|e| {
            TesseraError::class(format!("invalid default for `{}.{}`: {e}", class.name, p.name))
        })?;
    }
    for (i, field) in class.data.iter().enumerate() {
        if class.data[..i].contains(field) {
            return Err(TesseraError::class(format!(
                "`{}` declares render data field `{field}` more than once",
                class.name
            )));
        }
    }
    Ok(())
}

/// C3 linearization of `class` over its already-linearized bases.
fn linearize(
    class: &'static RenderClass,
    bases: &[Arc<ClassLayout>],
) -> TesseraResult<Vec<&'static RenderClass>> {
    let mut seqs: Vec<Vec<&'static RenderClass>> = bases.iter().map(|b| b.mro.clone()).collect();
    seqs.push(class.bases.to_vec());

    let mut out = vec![class];
    loop {
        seqs.retain(|s| !s.is_empty());
        if seqs.is_empty() {
            return Ok(out);
        }

        let next = seqs
            .iter()
            .map(|s| s[0])
            .find(|head| !seqs.iter().any(|s| s[1..].iter().any(|c| c.is(head))));
        let Some(next) = next else {
            return Err(TesseraError::class(format!(
                "cannot linearize the bases of `{}`: inconsistent inheritance order",
                class.name
            )));
        };

        out.push(next);
        for s in &mut seqs {
            if s[0].is(next) {
                s.remove(0);
            }
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/class.rs"]
mod tests;
