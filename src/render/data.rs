//! Per-operation working state of a renderable.
//!
//! A [`RenderData`] holds one [`DataNamespace`] per class in the render class's ancestry that
//! declares data fields. Fields start unset; the classes' `get_render_data` implementations
//! populate them and their finalize hooks release them.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

use crate::foundation::error::{TesseraError, TesseraResult};
use crate::foundation::geometry::Size;
use crate::render::class::{ClassLayout, RenderClass};
use crate::render::renderable::RENDERABLE;

type Slot = Option<Box<dyn Any + Send>>;

fn unset(class: &RenderClass, field: &str) -> TesseraError {
    TesseraError::data_field(format!("`{class}.{field}` is unset"))
}

fn mistyped<T>(class: &RenderClass, field: &str) -> TesseraError {
    TesseraError::data_field(format!(
        "`{class}.{field}` does not hold a `{}`",
        type_name::<T>()
    ))
}

/// Data fields of one declaring class.
pub struct DataNamespace {
    class: &'static RenderClass,
    values: Vec<Slot>,
}

impl DataNamespace {
    fn new(class: &'static RenderClass) -> Self {
        Self {
            class,
            values: class.own_data().iter().map(|_| None).collect(),
        }
    }

    pub fn class(&self) -> &'static RenderClass {
        self.class
    }

    pub fn fields(&self) -> &'static [&'static str] {
        self.class.own_data()
    }

    fn index(&self, field: &str) -> TesseraResult<usize> {
        self.class.data_index(field).ok_or_else(|| {
            TesseraError::data_field(format!(
                "unknown render data field `{field}` for `{}`",
                self.class
            ))
        })
    }

    pub fn is_set(&self, field: &str) -> TesseraResult<bool> {
        Ok(self.values[self.index(field)?].is_some())
    }

    pub fn get<T: Any>(&self, field: &str) -> TesseraResult<&T> {
        let value = self.values[self.index(field)?]
            .as_ref()
            .ok_or_else(|| unset(self.class, field))?;
        value
            .downcast_ref::<T>()
            .ok_or_else(|| mistyped::<T>(self.class, field))
    }

    pub fn get_mut<T: Any>(&mut self, field: &str) -> TesseraResult<&mut T> {
        let i = self.index(field)?;
        let class = self.class;
        match self.values[i].as_mut() {
            None => Err(unset(class, field)),
            Some(v) => v
                .downcast_mut::<T>()
                .ok_or_else(|| mistyped::<T>(class, field)),
        }
    }

    /// Store `value`, replacing (and dropping) any previous value.
    pub fn set<T: Any + Send>(&mut self, field: &str, value: T) -> TesseraResult<()> {
        let i = self.index(field)?;
        self.values[i] = Some(Box::new(value));
        Ok(())
    }

    /// Remove and return the value, leaving the field unset.
    pub fn take<T: Any>(&mut self, field: &str) -> TesseraResult<T> {
        let i = self.index(field)?;
        let value = self.values[i].take().ok_or_else(|| unset(self.class, field))?;
        match value.downcast::<T>() {
            Ok(v) => Ok(*v),
            Err(v) => {
                self.values[i] = Some(v);
                Err(mistyped::<T>(self.class, field))
            }
        }
    }

    fn clear(&mut self) {
        self.values.iter_mut().for_each(|v| *v = None);
    }
}

impl fmt::Debug for DataNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set: Vec<_> = self
            .fields()
            .iter()
            .zip(&self.values)
            .filter(|(_, v)| v.is_some())
            .map(|(name, _)| *name)
            .collect();
        f.debug_struct("DataNamespace")
            .field("class", &self.class.name())
            .field("set", &set)
            .finish()
    }
}

/// Mutable working state of one render or iteration operation.
///
/// Not `Clone`: finalizing must release every resource the data refers to exactly once.
/// Dropping unfinalized data finalizes it.
pub struct RenderData {
    render_cls: &'static RenderClass,
    layout: Arc<ClassLayout>,
    namespaces: Vec<DataNamespace>,
    finalized: bool,
}

impl RenderData {
    /// Empty data for `render_cls`; every field starts unset.
    pub fn new(render_cls: &'static RenderClass) -> TesseraResult<Self> {
        let layout = render_cls.layout()?;
        let namespaces = layout
            .data_classes()
            .iter()
            .copied()
            .map(DataNamespace::new)
            .collect();
        Ok(Self {
            render_cls,
            layout,
            namespaces,
            finalized: false,
        })
    }

    pub fn render_cls(&self) -> &'static RenderClass {
        self.render_cls
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    fn ensure_live(&self) -> TesseraResult<()> {
        if self.finalized {
            return Err(TesseraError::sequence(format!(
                "render data for `{}` has been finalized",
                self.render_cls
            )));
        }
        Ok(())
    }

    fn class_index(&self, class: &RenderClass) -> TesseraResult<usize> {
        if !self.layout.is_subclass_of(class) {
            return Err(TesseraError::incompatible(format!(
                "`{class}` is not an ancestor of `{}`",
                self.render_cls
            )));
        }
        self.layout.data_class_index(class).ok_or_else(|| {
            TesseraError::data_field(format!("`{class}` declares no render data fields"))
        })
    }

    fn field_index(&self, field: &str) -> TesseraResult<usize> {
        let owner = self.layout.data_owner(field).ok_or_else(|| {
            TesseraError::data_field(format!(
                "unknown render data field `{field}` for `{}`",
                self.render_cls
            ))
        })?;
        self.class_index(owner)
    }

    /// Namespace of the ancestor (or self) `class`.
    pub fn namespace(&self, class: &RenderClass) -> TesseraResult<&DataNamespace> {
        self.ensure_live()?;
        let i = self.class_index(class)?;
        Ok(&self.namespaces[i])
    }

    pub fn namespace_mut(&mut self, class: &RenderClass) -> TesseraResult<&mut DataNamespace> {
        self.ensure_live()?;
        let i = self.class_index(class)?;
        Ok(&mut self.namespaces[i])
    }

    /// Field by name. Data field names are unique across the hierarchy.
    pub fn get<T: Any>(&self, field: &str) -> TesseraResult<&T> {
        self.ensure_live()?;
        self.namespaces[self.field_index(field)?].get(field)
    }

    pub fn get_mut<T: Any>(&mut self, field: &str) -> TesseraResult<&mut T> {
        self.ensure_live()?;
        let i = self.field_index(field)?;
        self.namespaces[i].get_mut(field)
    }

    pub fn set<T: Any + Send>(&mut self, field: &str, value: T) -> TesseraResult<()> {
        self.ensure_live()?;
        let i = self.field_index(field)?;
        self.namespaces[i].set(field, value)
    }

    pub fn take<T: Any>(&mut self, field: &str) -> TesseraResult<T> {
        self.ensure_live()?;
        let i = self.field_index(field)?;
        self.namespaces[i].take(field)
    }

    pub fn is_set(&self, field: &str) -> TesseraResult<bool> {
        self.ensure_live()?;
        self.namespaces[self.field_index(field)?].is_set(field)
    }

    /// Current render size.
    pub fn size(&self) -> TesseraResult<Size> {
        self.get::<Size>("size").copied()
    }

    /// Number of the frame to render next.
    pub fn frame(&self) -> TesseraResult<usize> {
        self.get::<usize>("frame").copied()
    }

    /// Duration (ms) of the frame being rendered, if animated.
    pub fn duration(&self) -> TesseraResult<Option<u32>> {
        self.get::<Option<u32>>("duration").copied()
    }

    /// `true` when part of a render sequence rather than a one-off render.
    pub fn iteration(&self) -> TesseraResult<bool> {
        self.get::<bool>("iteration").copied()
    }

    pub fn set_size(&mut self, size: Size) -> TesseraResult<()> {
        self.namespace_mut(&RENDERABLE)?.set("size", size)
    }

    pub fn set_frame(&mut self, frame: usize) -> TesseraResult<()> {
        self.namespace_mut(&RENDERABLE)?.set("frame", frame)
    }

    pub fn set_duration(&mut self, duration: Option<u32>) -> TesseraResult<()> {
        self.namespace_mut(&RENDERABLE)?.set("duration", duration)
    }

    pub fn set_iteration(&mut self, iteration: bool) -> TesseraResult<()> {
        self.namespace_mut(&RENDERABLE)?.set("iteration", iteration)
    }

    /// Run every finalize hook in the ancestry (most derived first), then drop all values.
    ///
    /// Idempotent. Any later access fails with a sequencing error.
    pub fn finalize(&mut self) {
        if self.finalized {
            return;
        }
        let layout = Arc::clone(&self.layout);
        for class in layout.mro() {
            if let Some(hook) = class.finalizer() {
                hook(self);
            }
        }
        self.finalized = true;
        self.namespaces.iter_mut().for_each(DataNamespace::clear);
        tracing::trace!(class = self.render_cls.name(), "finalized render data");
    }
}

impl Drop for RenderData {
    fn drop(&mut self) {
        self.finalize();
    }
}

impl fmt::Debug for RenderData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderData")
            .field("render_cls", &self.render_cls.name())
            .field("finalized", &self.finalized)
            .field("namespaces", &self.namespaces)
            .finish()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/data.rs"]
mod tests;
