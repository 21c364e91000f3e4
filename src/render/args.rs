//! Immutable render arguments.
//!
//! [`RenderArgs`] for a render class carries one [`ArgsNamespace`] per class in its ancestry
//! that declares render parameters, ordered like the class's linearized ancestry. All-default
//! instances are interned per class, so repeated `RenderArgs::defaults(C)` calls share one
//! allocation and compare by pointer first.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use serde::Deserialize as _;

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::render::class::{ClassLayout, RenderClass};
use crate::render::param::ParamValue;

/// Render parameter values of one declaring class, in declaration order.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ArgsNamespace {
    class: &'static RenderClass,
    values: Arc<[ParamValue]>,
}

impl ArgsNamespace {
    fn ensure_params(class: &'static RenderClass) -> TesseraResult<()> {
        class.layout()?;
        if !class.declares_params() {
            return Err(TesseraError::args_field(format!(
                "`{class}` declares no render params"
            )));
        }
        Ok(())
    }

    /// Every field at its declared default.
    pub fn defaults(class: &'static RenderClass) -> TesseraResult<Self> {
        Self::ensure_params(class)?;
        Ok(Self {
            class,
            values: class.own_params().iter().map(|p| p.default.clone()).collect(),
        })
    }

    /// Positional values map to fields in declaration order; missing trailing fields keep
    /// their defaults.
    pub fn new<V>(
        class: &'static RenderClass,
        positional: impl IntoIterator<Item = V>,
    ) -> TesseraResult<Self>
    where
        V: Into<ParamValue>,
    {
        Self::ensure_params(class)?;
        let params = class.own_params();
        let mut values: Vec<ParamValue> = params.iter().map(|p| p.default.clone()).collect();
        for (i, value) in positional.into_iter().enumerate() {
            let Some(param) = params.get(i) else {
                return Err(TesseraError::args_field(format!(
                    "`{class}` declares {} render params, got more positional values",
                    params.len()
                )));
            };
            let value = value.into();
            param.check(class.name(), &value)?;
            values[i] = value;
        }
        Ok(Self {
            class,
            values: values.into(),
        })
    }

    /// Named values; unnamed fields keep their defaults.
    pub fn with_fields<K, V>(
        class: &'static RenderClass,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> TesseraResult<Self>
    where
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        Self::defaults(class)?.update(fields)
    }

    /// Copy with the named fields replaced.
    pub fn update<K, V>(&self, fields: impl IntoIterator<Item = (K, V)>) -> TesseraResult<Self>
    where
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        let mut values = self.values.to_vec();
        for (name, value) in fields {
            let i = self.index(name.as_ref())?;
            let value = value.into();
            self.class.own_params()[i].check(self.class.name(), &value)?;
            values[i] = value;
        }
        Ok(Self {
            class: self.class,
            values: values.into(),
        })
    }

    fn index(&self, name: &str) -> TesseraResult<usize> {
        self.class.param_index(name).ok_or_else(|| {
            TesseraError::args_field(format!(
                "unknown render param `{name}` for `{}`",
                self.class
            ))
        })
    }

    pub fn class(&self) -> &'static RenderClass {
        self.class
    }

    pub fn get(&self, name: &str) -> TesseraResult<&ParamValue> {
        Ok(&self.values[self.index(name)?])
    }

    /// Typed field value.
    pub fn get_as<'a, T>(&'a self, name: &str) -> TesseraResult<T>
    where
        T: TryFrom<&'a ParamValue, Error = TesseraError>,
    {
        T::try_from(self.get(name)?)
    }

    /// `(name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static str, &ParamValue)> + '_ {
        self.class
            .own_params()
            .iter()
            .map(|p| p.name)
            .zip(self.values.iter())
    }

    pub fn as_map(&self) -> BTreeMap<&'static str, ParamValue> {
        self.fields().map(|(k, v)| (k, v.clone())).collect()
    }

    pub fn is_default(&self) -> bool {
        self.class
            .own_params()
            .iter()
            .zip(self.values.iter())
            .all(|(p, v)| p.default == *v)
    }

    /// Render args for the declaring class with this namespace in place of its defaults.
    pub fn to_render_args(&self) -> TesseraResult<RenderArgs> {
        RenderArgs::new(self.class, None, [self.clone()])
    }
}

impl fmt::Debug for ArgsNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct(self.class.name());
        for (name, value) in self.fields() {
            s.field(name, value);
        }
        s.finish()
    }
}

struct ArgsInner {
    render_cls: &'static RenderClass,
    layout: Arc<ClassLayout>,
    /// Aligned with `layout.param_classes()`.
    namespaces: Vec<ArgsNamespace>,
}

/// Composed render parameter values for one render class.
///
/// Cheap to clone; equality and hashing are structural.
#[derive(Clone)]
pub struct RenderArgs {
    inner: Arc<ArgsInner>,
}

static INTERNED: LazyLock<Mutex<HashMap<&'static str, RenderArgs>>> =
    LazyLock::new(Default::default);

fn default_namespaces(layout: &ClassLayout) -> TesseraResult<Vec<ArgsNamespace>> {
    layout
        .param_classes()
        .iter()
        .copied()
        .map(ArgsNamespace::defaults)
        .collect()
}

impl RenderArgs {
    fn from_parts(
        render_cls: &'static RenderClass,
        layout: Arc<ClassLayout>,
        namespaces: Vec<ArgsNamespace>,
    ) -> Self {
        Self {
            inner: Arc::new(ArgsInner {
                render_cls,
                layout,
                namespaces,
            }),
        }
    }

    /// The interned all-defaults instance for `render_cls`.
    pub fn defaults(render_cls: &'static RenderClass) -> TesseraResult<Self> {
        {
            let interned = INTERNED.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(args) = interned.get(render_cls.name()) {
                if args.render_cls().is(render_cls) {
                    return Ok(args.clone());
                }
            }
        }

        let layout = render_cls.layout()?;
        let namespaces = default_namespaces(&layout)?;
        let args = Self::from_parts(render_cls, layout, namespaces);

        let mut interned = INTERNED.lock().unwrap_or_else(PoisonError::into_inner);
        let args = interned.entry(render_cls.name()).or_insert(args).clone();
        tracing::debug!(class = render_cls.name(), "interned default render args");
        Ok(args)
    }

    /// Compose render args for `render_cls`.
    ///
    /// Later sources win: declared defaults, then `init` (which must be for `render_cls` or
    /// one of its ancestors), then `namespaces` (each for a class in the ancestry that
    /// declares params). Without explicit namespaces an all-default result is the interned
    /// instance.
    pub fn new(
        render_cls: &'static RenderClass,
        init: Option<&RenderArgs>,
        namespaces: impl IntoIterator<Item = ArgsNamespace>,
    ) -> TesseraResult<Self> {
        let explicit: Vec<ArgsNamespace> = namespaces.into_iter().collect();
        if init.is_none() && explicit.is_empty() {
            return Self::defaults(render_cls);
        }

        let layout = render_cls.layout()?;
        let mut values = default_namespaces(&layout)?;

        if let Some(init) = init {
            if !layout.is_subclass_of(init.render_cls()) {
                return Err(TesseraError::incompatible(format!(
                    "cannot initialize render args for `{render_cls}` from args for `{}`",
                    init.render_cls()
                )));
            }
            for ns in init.namespaces() {
                if let Some(i) = layout.param_class_index(ns.class) {
                    values[i] = ns.clone();
                }
            }
        }

        let has_explicit = !explicit.is_empty();
        for ns in explicit {
            let i = layout.param_class_index(ns.class).ok_or_else(|| {
                TesseraError::incompatible(format!(
                    "render args namespace for `{}` does not belong to `{render_cls}`",
                    ns.class
                ))
            })?;
            values[i] = ns;
        }

        let args = Self::from_parts(render_cls, layout, values);
        if !has_explicit && args.is_default() {
            return Self::defaults(render_cls);
        }
        Ok(args)
    }

    /// Merge several namespaces into render args for `render_cls`.
    pub fn from_namespaces(
        render_cls: &'static RenderClass,
        namespaces: impl IntoIterator<Item = ArgsNamespace>,
    ) -> TesseraResult<Self> {
        Self::new(render_cls, None, namespaces)
    }

    /// Build from JSON shaped `{ "<class name>": { "<param>": value, .. }, .. }`.
    pub fn from_json(
        render_cls: &'static RenderClass,
        json: &serde_json::Value,
    ) -> TesseraResult<Self> {
        let serde_json::Value::Object(classes) = json else {
            return Err(TesseraError::validation(
                "render args JSON must be an object keyed by render class name",
            ));
        };
        let layout = render_cls.layout()?;

        let mut namespaces = Vec::with_capacity(classes.len());
        for (class_name, fields) in classes {
            let class = layout.find_class(class_name).ok_or_else(|| {
                TesseraError::args_field(format!(
                    "`{class_name}` is not a render class in the ancestry of `{render_cls}`"
                ))
            })?;
            let serde_json::Value::Object(fields) = fields else {
                return Err(TesseraError::validation(format!(
                    "render args for `{class_name}` must be a JSON object"
                )));
            };
            let mut values = Vec::with_capacity(fields.len());
            for (name, value) in fields {
                let value = ParamValue::deserialize(value).map_err(|e| {
                    TesseraError::param(format!("`{class_name}.{name}`: {e}"))
                })?;
                values.push((name.as_str(), value));
            }
            namespaces.push(ArgsNamespace::with_fields(class, values)?);
        }
        Self::new(render_cls, None, namespaces)
    }

    pub fn render_cls(&self) -> &'static RenderClass {
        self.inner.render_cls
    }

    /// Namespaces in linearized ancestry order.
    pub fn namespaces(&self) -> &[ArgsNamespace] {
        &self.inner.namespaces
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArgsNamespace> {
        self.inner.namespaces.iter()
    }

    /// `true` if both handles refer to the same instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn is_default(&self) -> bool {
        self.inner.namespaces.iter().all(ArgsNamespace::is_default)
    }

    /// Namespace of `class`, which must declare params and be in the ancestry.
    pub fn get(&self, class: &RenderClass) -> TesseraResult<&ArgsNamespace> {
        if !class.declares_params() {
            return Err(TesseraError::args_field(format!(
                "`{class}` declares no render params"
            )));
        }
        let i = self.inner.layout.param_class_index(class).ok_or_else(|| {
            TesseraError::incompatible(format!(
                "`{class}` is not an ancestor of `{}`",
                self.render_cls()
            ))
        })?;
        Ok(&self.inner.namespaces[i])
    }

    /// Value of the composed parameter `name` (the most derived declaration wins).
    pub fn param(&self, name: &str) -> TesseraResult<&ParamValue> {
        let owner = self.inner.layout.param_owner(name).ok_or_else(|| {
            TesseraError::args_field(format!(
                "unknown render param `{name}` for `{}`",
                self.render_cls()
            ))
        })?;
        self.get(owner)?.get(name)
    }

    /// Copy with the named fields of `class`'s namespace replaced.
    pub fn update<K, V>(
        &self,
        class: &RenderClass,
        fields: impl IntoIterator<Item = (K, V)>,
    ) -> TesseraResult<Self>
    where
        K: AsRef<str>,
        V: Into<ParamValue>,
    {
        let ns = self.get(class)?.update(fields)?;
        let mut namespaces = self.inner.namespaces.clone();
        if let Some(slot) = namespaces.iter_mut().find(|n| n.class.is(ns.class)) {
            *slot = ns;
        }
        Ok(Self::from_parts(
            self.render_cls(),
            Arc::clone(&self.inner.layout),
            namespaces,
        ))
    }

    /// Equivalent args for an ancestor or descendant of this render class.
    ///
    /// Namespaces the target does not have are dropped; ones it has but these args lack
    /// take their defaults.
    pub fn convert(&self, target: &'static RenderClass) -> TesseraResult<Self> {
        if target.is(self.render_cls()) {
            return Ok(self.clone());
        }
        let target_layout = target.layout()?;
        let related = target_layout.is_subclass_of(self.render_cls())
            || self.inner.layout.is_subclass_of(target);
        if !related {
            return Err(TesseraError::incompatible(format!(
                "cannot convert render args for `{}` to `{target}`",
                self.render_cls()
            )));
        }

        let mut values = default_namespaces(&target_layout)?;
        for ns in self.namespaces() {
            if let Some(i) = target_layout.param_class_index(ns.class) {
                values[i] = ns.clone();
            }
        }
        let args = Self::from_parts(target, target_layout, values);
        if args.is_default() {
            return Self::defaults(target);
        }
        Ok(args)
    }
}

impl PartialEq for RenderArgs {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
            || (self.render_cls().is(other.render_cls())
                && self.inner.namespaces == other.inner.namespaces)
    }
}

impl Eq for RenderArgs {}

impl Hash for RenderArgs {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.render_cls().hash(state);
        self.inner.namespaces.hash(state);
    }
}

impl fmt::Debug for RenderArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderArgs")
            .field("render_cls", &self.render_cls().name())
            .field("namespaces", &self.inner.namespaces)
            .finish()
    }
}

impl<'a> IntoIterator for &'a RenderArgs {
    type Item = &'a ArgsNamespace;
    type IntoIter = std::slice::Iter<'a, ArgsNamespace>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/args.rs"]
mod tests;
