//! Interpreting content streams: tracking the color state and dispatching operators to handlers.

use crate::color::ColorSpace;
use crate::context::Context;
use crate::error::Result;
use crate::image::{DefaultCodec, ImageCodec};
use crate::resources::ResourceScope;
use crate::state::GraphicsState;
use grisaille_syntax::Operator;
use log::trace;
use rustc_hash::FxHashMap;
use std::sync::Arc;

pub(crate) mod state;

/// A callback function for resolving warnings during interpretation.
pub type WarningSinkFn = Arc<dyn Fn(InterpreterWarning) + Send + Sync>;

/// The codec used for decoding and re-encoding images.
pub type ImageCodecRef = Arc<dyn ImageCodec + Send + Sync>;

/// The recursion depth used by [`InterpreterSettings::default`].
pub const DEFAULT_MAX_DEPTH: usize = 32;

#[derive(Clone)]
/// Settings that should be applied during the interpretation process.
pub struct InterpreterSettings {
    /// In certain cases, a warning is emitted in case an issue was encountered while
    /// interpreting a content stream, for example an image that couldn't be decoded and
    /// was skipped. Providing a callback allows you to catch those warnings and handle
    /// them, if desired.
    pub warning_sink: WarningSinkFn,

    /// The codec for image data. The default codec supports the filters of
    /// `grisaille-syntax`.
    pub image_codec: ImageCodecRef,

    /// How deeply forms and patterns may be nested.
    ///
    /// Content streams nested deeper are not examined, which also stops documents whose
    /// forms paint themselves. Exceeding the limit is reported as
    /// [`InterpreterWarning::RecursionLimit`].
    pub max_depth: usize,
}

impl Default for InterpreterSettings {
    fn default() -> Self {
        Self {
            warning_sink: Arc::new(|_| {}),
            image_codec: Arc::new(DefaultCodec),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
/// Warnings that can occur while interpreting a content stream.
pub enum InterpreterWarning {
    /// A JPX image was encountered. JPX data is never decoded: color detection assumes
    /// such images are colored, the grayscale transform leaves them unchanged.
    JpxImage,
    /// An image failed to decode and was skipped.
    ImageDecodeFailure,
    /// An image couldn't be re-encoded with its original filter and was encoded with
    /// `FlateDecode` instead.
    EncoderFallback,
    /// A `Q` operator had no matching `q`.
    StateUnderflow,
    /// Forms or patterns were nested deeper than [`InterpreterSettings::max_depth`].
    RecursionLimit,
}

/// A handler that is invoked for an operator, after the graphics state was updated.
pub type Handler<C> = fn(&mut C, &Operator, &GraphicsState) -> Result<()>;

/// The handlers of a scan over a content stream.
pub struct HandlerSet<C> {
    all_operators: Option<Handler<C>>,
    other_operators: Option<Handler<C>>,
    operators: FxHashMap<&'static str, Handler<C>>,
}

impl<C> HandlerSet<C> {
    /// Create an empty set of handlers.
    pub fn new() -> Self {
        Self {
            all_operators: None,
            other_operators: None,
            operators: FxHashMap::default(),
        }
    }

    /// Register a handler that is invoked for every operator, before the handler for
    /// the specific operator.
    pub fn on_all(mut self, handler: Handler<C>) -> Self {
        self.all_operators = Some(handler);
        self
    }

    /// Register a handler that is invoked for operators without a handler of their own.
    pub fn on_other(mut self, handler: Handler<C>) -> Self {
        self.other_operators = Some(handler);
        self
    }

    /// Register a handler for an operator.
    pub fn on(mut self, name: &'static str, handler: Handler<C>) -> Self {
        self.operators.insert(name, handler);
        self
    }

    /// Register the same handler for several operators.
    pub fn on_many(mut self, names: &[&'static str], handler: Handler<C>) -> Self {
        for name in names {
            self.operators.insert(*name, handler);
        }

        self
    }

    fn get(&self, name: &str) -> Option<Handler<C>> {
        self.operators.get(name).copied()
    }
}

impl<C> Default for HandlerSet<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// The state a scan threads through its handlers.
pub trait ScanContext {
    /// The resources color spaces are resolved against.
    fn resources(&self) -> &dyn ResourceScope;

    /// The settings of the scan.
    fn settings(&self) -> &InterpreterSettings;

    /// Whether the scan already has its answer. Remaining operators are skipped.
    fn finished(&self) -> bool {
        false
    }
}

/// Walk over `ops`, tracking the color state, and invoke the handlers for each operator.
///
/// The state is seeded with `initial`. Color operators update the state before the
/// handlers run, so handlers see the color that the operator selected. Nested content
/// (forms, patterns, images) is not entered, this is up to the handlers.
///
/// The first error returned by a handler or raised by a color operator aborts the scan.
pub fn process<C: ScanContext>(
    ops: &[Operator],
    handlers: &HandlerSet<C>,
    ctx: &mut C,
    initial: GraphicsState,
) -> Result<()> {
    let mut context = Context::new(initial);

    for op in ops {
        if ctx.finished() {
            trace!("scan finished early, skipping remaining operators");
            break;
        }

        match op.name.as_str() {
            "q" => context.save_state(),
            "Q" => {
                if !context.restore_state() {
                    (ctx.settings().warning_sink)(InterpreterWarning::StateUnderflow);
                }
            }
            "CS" | "cs" => state::set_color_space(op, ctx.resources(), context.get_mut())?,
            "SC" | "SCN" | "sc" | "scn" => state::set_color(op, context.get_mut())?,
            "G" | "g" => state::set_device_color(op, ColorSpace::device_gray(), context.get_mut())?,
            "RG" | "rg" => state::set_device_color(op, ColorSpace::device_rgb(), context.get_mut())?,
            "K" | "k" => state::set_device_color(op, ColorSpace::device_cmyk(), context.get_mut())?,
            _ => {}
        }

        if let Some(handler) = handlers.all_operators {
            handler(ctx, op, context.get())?;
        }

        if let Some(handler) = handlers.get(&op.name).or(handlers.other_operators) {
            handler(ctx, op, context.get())?;
        }
    }

    Ok(())
}
