//! PDF functions, as used by the tint transforms of `Separation` and `DeviceN`
//! color spaces.

mod type2;
mod type4;

use crate::error::{Error, Result};
use grisaille_syntax::object::{Dict, Object};
use log::warn;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

pub(crate) use type2::Type2;
pub(crate) use type4::Type4;

/// The input or output values of a function.
pub type Values = SmallVec<[f32; 6]>;

/// A list of `(min, max)` intervals.
pub(crate) type TupleVec = SmallVec<[(f32, f32); 4]>;

#[derive(Debug)]
pub(crate) enum FunctionType {
    Type2(Type2),
    Type4(Type4),
}

/// A PDF function.
#[derive(Debug, Clone)]
pub struct Function(Arc<FunctionType>);

impl Function {
    /// Create an exponential interpolation function (type 2) with a single input.
    pub fn exponential(domain: (f32, f32), c0: &[f32], c1: &[f32], n: f32) -> Self {
        Self(Arc::new(FunctionType::Type2(Type2::new(
            domain,
            c0.iter().copied().collect(),
            c1.iter().copied().collect(),
            n,
        ))))
    }

    /// Create a PostScript calculator function (type 4) from the text of its program.
    pub fn postscript(
        domain: &[(f32, f32)],
        range: &[(f32, f32)],
        program: &str,
    ) -> Result<Self> {
        let clamper = Clamper {
            domain: domain.iter().copied().collect(),
            range: Some(range.iter().copied().collect()),
        };

        Ok(Self(Arc::new(FunctionType::Type4(Type4::new(
            program.as_bytes(),
            clamper,
        )?))))
    }

    /// Create a function from its dictionary and, for type 4 functions, its stream data.
    pub fn from_dict(dict: &Dict, stream_data: Option<&[u8]>) -> Result<Self> {
        let function_type = dict
            .get("FunctionType")
            .and_then(Object::as_number)
            .map(|n| n.as_i32())
            .ok_or_else(|| Error::Function("missing function type".to_string()))?;

        let clamper = Clamper::from_dict(dict)?;

        let inner = match function_type {
            2 => FunctionType::Type2(Type2::from_dict(dict, clamper)?),
            4 => {
                let data = stream_data.ok_or_else(|| {
                    Error::Function("type 4 function without a program".to_string())
                })?;

                FunctionType::Type4(Type4::new(data, clamper)?)
            }
            other => {
                warn!("unsupported function type {other}");

                return Err(Error::Function(format!("unsupported function type {other}")));
            }
        };

        Ok(Self(Arc::new(inner)))
    }

    /// The function type, as it appears in the `/FunctionType` entry.
    pub fn function_type(&self) -> u8 {
        match self.0.as_ref() {
            FunctionType::Type2(_) => 2,
            FunctionType::Type4(_) => 4,
        }
    }

    /// Evaluate the function.
    pub fn eval(&self, input: &[f32]) -> Option<Values> {
        match self.0.as_ref() {
            FunctionType::Type2(t) => Some(t.eval(*input.first()?)),
            FunctionType::Type4(t) => t.eval(input.iter().copied().collect()),
        }
    }

    /// The dictionary describing the function.
    ///
    /// For type 4 functions, the program itself is returned by [`Function::program`]
    /// and belongs into the stream data.
    pub fn to_dict(&self) -> Dict {
        let mut dict = Dict::new();
        dict.insert("FunctionType", i32::from(self.function_type()));

        match self.0.as_ref() {
            FunctionType::Type2(t) => {
                t.clamper.write(&mut dict);
                t.write(&mut dict);
            }
            FunctionType::Type4(t) => t.clamper.write(&mut dict),
        }

        dict
    }

    /// The text of the program of a type 4 function.
    pub fn program(&self) -> Option<String> {
        match self.0.as_ref() {
            FunctionType::Type4(t) => Some(t.to_string()),
            FunctionType::Type2(_) => None,
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_ref() {
            FunctionType::Type2(t) => write!(f, "type 2 function (N = {})", t.n),
            FunctionType::Type4(t) => write!(f, "{t}"),
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Clamper {
    pub(crate) domain: TupleVec,
    pub(crate) range: Option<TupleVec>,
}

impl Clamper {
    fn from_dict(dict: &Dict) -> Result<Self> {
        let domain = dict
            .get("Domain")
            .and_then(read_tuples)
            .ok_or_else(|| Error::Function("missing domain".to_string()))?;
        let range = dict.get("Range").and_then(read_tuples);

        Ok(Self { domain, range })
    }

    pub(crate) fn clamp_input(&self, input: &mut [f32]) {
        for (val, (min, max)) in input.iter_mut().zip(self.domain.iter()) {
            *val = val.clamp(*min, *max);
        }
    }

    pub(crate) fn clamp_output(&self, output: &mut [f32]) {
        if let Some(range) = &self.range {
            for (val, (min, max)) in output.iter_mut().zip(range.iter()) {
                *val = val.clamp(*min, *max);
            }
        }
    }

    fn write(&self, dict: &mut Dict) {
        dict.insert("Domain", tuples_to_object(&self.domain));

        if let Some(range) = &self.range {
            dict.insert("Range", tuples_to_object(range));
        }
    }
}

fn read_tuples(object: &Object) -> Option<TupleVec> {
    let values = object
        .as_array()?
        .iter()
        .map(Object::as_f32)
        .collect::<Option<SmallVec<[f32; 8]>>>()?;

    if values.len() % 2 != 0 {
        warn!("odd number of values in function interval");

        return None;
    }

    Some(values.chunks_exact(2).map(|c| (c[0], c[1])).collect())
}

pub(crate) fn tuples_to_object(tuples: &[(f32, f32)]) -> Object {
    Object::Array(
        tuples
            .iter()
            .flat_map(|(min, max)| [Object::from(*min), Object::from(*max)])
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use grisaille_syntax::object::Number;

    #[test]
    fn to_dict() {
        let func =
            Function::postscript(&[(0.0, 1.0)], &[(0.0, 1.0)], "{ 0.5 mul }").unwrap();
        let dict = func.to_dict();

        assert_eq!(
            dict.get("FunctionType"),
            Some(&Object::Number(Number::Integer(4)))
        );
        assert!(dict.get("Domain").is_some());
        assert_eq!(func.program().unwrap(), "{ 0.5 mul }");
    }

    #[test]
    fn from_dict() {
        let mut dict = Dict::new();
        dict.insert("FunctionType", 4);
        dict.insert("Domain", tuples_to_object(&[(0.0, 1.0), (0.0, 1.0)]));
        dict.insert("Range", tuples_to_object(&[(0.0, 1.0)]));

        let func = Function::from_dict(&dict, Some(b"{ add }")).unwrap();
        assert_eq!(func.eval(&[0.75, 0.5]).unwrap().as_slice(), &[1.0]);

        assert!(Function::from_dict(&dict, None).is_err());
    }

    #[test]
    fn unsupported_type() {
        let mut dict = Dict::new();
        dict.insert("FunctionType", 0);
        dict.insert("Domain", tuples_to_object(&[(0.0, 1.0)]));

        assert!(matches!(
            Function::from_dict(&dict, None),
            Err(Error::Function(_))
        ));
    }
}
