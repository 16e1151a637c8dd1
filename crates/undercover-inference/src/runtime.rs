use crate::shape::TensorShape;
use undercover_assets::ModelAsset;

/// An inference engine able to turn model bytes into a live session.
///
/// The adapter treats the engine as opaque: it only relies on the declared tensor shapes and on
/// `run` filling the output buffer. Bindings for a concrete engine (TensorFlow Lite, ONNX, ...)
/// implement this trait outside of this crate.
pub trait InferenceRuntime {
    /// Initialize a session bound to `model`.
    ///
    /// The session may keep the asset alive for as long as it needs the bytes; the mapping is
    /// released when the session is dropped.
    fn initialize(&self, model: ModelAsset) -> anyhow::Result<Box<dyn RuntimeSession>>;
}

impl<F> InferenceRuntime for F
where
    F: Fn(ModelAsset) -> anyhow::Result<Box<dyn RuntimeSession>>,
{
    fn initialize(&self, model: ModelAsset) -> anyhow::Result<Box<dyn RuntimeSession>> {
        self(model)
    }
}

/// A live runtime session.
///
/// Sessions are not required to be `Sync`: the adapter hands a session to a single host thread
/// and never calls it from two threads at once.
pub trait RuntimeSession: Send + 'static {
    /// Declared shape of input tensor `index`.
    fn input_shape(&self, index: usize) -> anyhow::Result<TensorShape>;

    /// Declared shape of output tensor `index`.
    fn output_shape(&self, index: usize) -> anyhow::Result<TensorShape>;

    /// Run one forward pass reading `input` and writing `output`.
    ///
    /// `output` is sized exactly for output tensor 0.
    fn run(&mut self, input: &[u8], output: &mut [u8]) -> anyhow::Result<()>;
}
