use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{schema_of, Payload};
use crate::protocol::error::{MinidubboError, Result};
use crate::protocol::TypeDescriptor;

/// An ordered, typed argument list.
///
/// Implemented for tuples of up to eight serde types. The tuple's element
/// types become the request's parameter type descriptors, and each element is
/// encoded as its own [`Payload`].
///
/// # Example
///
/// ```
/// use minidubbo_common::Params;
///
/// let args = ("hi".to_string(), 3u32);
/// let payloads = args.encode().unwrap();
/// let back = <(String, u32)>::decode(&payloads).unwrap();
/// assert_eq!(args, back);
/// assert_eq!(<(String, u32)>::descriptors(), vec!["alloc::string::String", "u32"]);
/// ```
pub trait Params: Sized + Send + 'static {
    fn descriptors() -> Vec<TypeDescriptor>;

    fn encode(&self) -> Result<Vec<Payload>>;

    fn decode(payloads: &[Payload]) -> Result<Self>;
}

fn check_arity(expected: usize, payloads: &[Payload]) -> Result<()> {
    if payloads.len() != expected {
        return Err(MinidubboError::InvalidRequest(format!(
            "expected {} parameters, got {}",
            expected,
            payloads.len()
        )));
    }
    Ok(())
}

macro_rules! impl_params {
    ($len:expr; $($name:ident : $idx:tt),*) => {
        impl<$($name),*> Params for ($($name,)*)
        where
            $($name: Serialize + DeserializeOwned + Send + 'static,)*
        {
            fn descriptors() -> Vec<TypeDescriptor> {
                vec![$(schema_of::<$name>().type_name().to_string()),*]
            }

            fn encode(&self) -> Result<Vec<Payload>> {
                Ok(vec![$(Payload::encode(&self.$idx)?),*])
            }

            fn decode(payloads: &[Payload]) -> Result<Self> {
                check_arity($len, payloads)?;
                Ok(($(payloads[$idx].decode::<$name>()?,)*))
            }
        }
    };
}

impl_params!(0;);
impl_params!(1; A: 0);
impl_params!(2; A: 0, B: 1);
impl_params!(3; A: 0, B: 1, C: 2);
impl_params!(4; A: 0, B: 1, C: 2, D: 3);
impl_params!(5; A: 0, B: 1, C: 2, D: 3, E: 4);
impl_params!(6; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5);
impl_params!(7; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6);
impl_params!(8; A: 0, B: 1, C: 2, D: 3, E: 4, F: 5, G: 6, H: 7);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_params() {
        assert!(<()>::descriptors().is_empty());
        assert!(().encode().unwrap().is_empty());
        <()>::decode(&[]).unwrap();
    }

    #[test]
    fn test_mixed_params_round_trip() {
        let args = (1u8, "two".to_string(), vec![3i64], Some(4.5f32));
        let payloads = args.encode().unwrap();
        assert_eq!(payloads.len(), 4);

        let decoded = <(u8, String, Vec<i64>, Option<f32>)>::decode(&payloads).unwrap();
        assert_eq!(decoded, args);
    }

    #[test]
    fn test_arity_mismatch_is_rejected() {
        let payloads = ("a".to_string(),).encode().unwrap();
        let err = <(String, String)>::decode(&payloads).unwrap_err();
        assert!(matches!(err, MinidubboError::InvalidRequest(_)));
    }

    #[test]
    fn test_element_type_mismatch_is_rejected() {
        let payloads = (5u64,).encode().unwrap();
        assert!(matches!(
            <(i64,)>::decode(&payloads),
            Err(MinidubboError::SchemaMismatch { .. })
        ));
    }
}
