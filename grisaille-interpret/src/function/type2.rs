use crate::error::{Error, Result};
use crate::function::{Clamper, Values};
use grisaille_syntax::object::{Dict, Object};
use smallvec::{SmallVec, smallvec};

/// A type 2 function (exponential interpolation).
#[derive(Debug)]
pub(crate) struct Type2 {
    c0: Values,
    c1: Values,
    pub(crate) clamper: Clamper,
    pub(crate) n: f32,
}

impl Type2 {
    pub(crate) fn new(domain: (f32, f32), c0: Values, c1: Values, n: f32) -> Self {
        Self {
            c0,
            c1,
            clamper: Clamper {
                domain: smallvec![domain],
                range: None,
            },
            n,
        }
    }

    pub(crate) fn from_dict(dict: &Dict, clamper: Clamper) -> Result<Self> {
        let c0 = dict.get("C0").and_then(read_values).unwrap_or(smallvec![0.0]);
        let c1 = dict.get("C1").and_then(read_values).unwrap_or(smallvec![1.0]);
        let n = dict
            .get("N")
            .and_then(Object::as_f32)
            .ok_or_else(|| Error::Function("missing exponent".to_string()))?;

        Ok(Self { c0, c1, clamper, n })
    }

    pub(crate) fn eval(&self, input: f32) -> Values {
        let mut input = [input];
        self.clamper.clamp_input(&mut input);

        let mut out = self
            .c0
            .iter()
            .zip(self.c1.iter())
            .map(|(c0, c1)| *c0 + input[0].powf(self.n) * (*c1 - *c0))
            .collect::<SmallVec<_>>();

        self.clamper.clamp_output(&mut out);

        out
    }

    pub(crate) fn write(&self, dict: &mut Dict) {
        let values = |v: &Values| Object::Array(v.iter().map(|n| Object::from(*n)).collect());

        dict.insert("C0", values(&self.c0));
        dict.insert("C1", values(&self.c1));
        dict.insert("N", self.n);
    }
}

fn read_values(object: &Object) -> Option<Values> {
    object.as_array()?.iter().map(Object::as_f32).collect()
}
