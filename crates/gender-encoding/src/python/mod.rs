use numpy::{PyArray2, ToPyArray};
use pyo3::prelude::*;

use crate::encoder::{EncoderParams, NameEncoder};

/// A wrapper struct for NameEncoder to expose it to Python.
#[pyclass]
#[derive(Clone, Debug)]
struct RustNameEncoder {
    inner: NameEncoder,
}

#[pymethods]
impl RustNameEncoder {
    /// Creates a new RustNameEncoder with the given sequence length.
    #[new]
    fn new(sequence_length: usize) -> Self {
        Self {
            inner: NameEncoder::new(EncoderParams::new(sequence_length)),
        }
    }

    /// Returns a string representation of the RustNameEncoder.
    fn __repr__(&self) -> String {
        format!(
            "RustNameEncoder(sequence_length={})",
            self.inner.sequence_length()
        )
    }

    /// Encode a list of names into a [len(names), sequence_length] float32
    /// numpy array.
    fn encode<'py>(&self, py: Python<'py>, names: Vec<String>) -> Bound<'py, PyArray2<f32>> {
        self.inner.encode(&names).to_pyarray(py)
    }
}

#[pymodule]
fn gender_encoding(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<RustNameEncoder>()?;
    Ok(())
}
