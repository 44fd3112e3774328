//! Byte encoding of a signature:
//! `iv || chall_3 || u_tilde || a_tilde || d || c_1 .. c_{tau-1} ||`
//! followed, for every repetition, by its co-path and the hidden commitment.
//! The length only depends on the parameter set.

use std::io::{Read, Write};

use ark_std::{end_timer, start_timer};

use crate::veccom::AllButOneOpening;
use crate::{
    ParamSet, RainRingError, RainRingSignature, Result, ELL_BYTES, ELL_HAT_BYTES, IV_SIZE,
    LAMBDA_BYTES,
};

impl RainRingSignature {
    /// Encoded size of a signature under `params`. Only meaningful for a
    /// parameter set that passes `validate`.
    pub fn byte_len(params: &ParamSet) -> usize {
        let openings: usize = (0..params.tau)
            .map(|i| (params.k(i) + 1) * LAMBDA_BYTES)
            .sum();
        IV_SIZE
            + 3 * LAMBDA_BYTES
            + ELL_BYTES
            + params.tau.saturating_sub(1) * ELL_HAT_BYTES
            + openings
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut res = Vec::new();
        res.extend_from_slice(&self.iv);
        res.extend_from_slice(&self.chall_3);
        res.extend_from_slice(&self.u_tilde);
        res.extend_from_slice(&self.a_tilde);
        res.extend_from_slice(&self.d);
        self.c.iter().for_each(|ci| res.extend_from_slice(ci));
        for opening in self.openings.iter() {
            opening
                .co_path
                .iter()
                .for_each(|node| res.extend_from_slice(node));
            res.extend_from_slice(&opening.hidden_com);
        }
        res
    }

    pub fn serialize<W: Write>(&self, mut writer: W) -> Result<()> {
        let timer = start_timer!(|| "RainRing serialization");
        writer.write_all(&self.to_bytes())?;
        end_timer!(timer);
        Ok(())
    }

    pub fn deserialize<R: Read>(mut reader: R, params: &ParamSet) -> Result<Self> {
        params.validate()?;
        let timer = start_timer!(|| "RainRing deserialization");
        let mut iv = [0u8; IV_SIZE];
        let mut chall_3 = [0u8; LAMBDA_BYTES];
        let mut u_tilde = [0u8; LAMBDA_BYTES];
        let mut a_tilde = [0u8; LAMBDA_BYTES];
        let mut d = vec![0u8; ELL_BYTES];
        reader.read_exact(&mut iv)?;
        reader.read_exact(&mut chall_3)?;
        reader.read_exact(&mut u_tilde)?;
        reader.read_exact(&mut a_tilde)?;
        reader.read_exact(&mut d)?;

        let mut c = vec![vec![0u8; ELL_HAT_BYTES]; params.tau - 1];
        for ci in c.iter_mut() {
            reader.read_exact(ci)?;
        }

        let mut openings = Vec::with_capacity(params.tau);
        for i in 0..params.tau {
            let mut opening = AllButOneOpening {
                co_path: vec![[0u8; LAMBDA_BYTES]; params.k(i)],
                hidden_com: [0u8; LAMBDA_BYTES],
            };
            for node in opening.co_path.iter_mut() {
                reader.read_exact(node)?;
            }
            reader.read_exact(&mut opening.hidden_com)?;
            openings.push(opening);
        }
        end_timer!(timer);

        Ok(Self {
            iv,
            chall_3,
            u_tilde,
            a_tilde,
            d,
            c,
            openings,
        })
    }

    /// Decode a signature, rejecting short and trailing input.
    pub fn from_bytes(bytes: &[u8], params: &ParamSet) -> Result<Self> {
        params.validate()?;
        let expected = Self::byte_len(params);
        if bytes.len() != expected {
            return Err(RainRingError::Encoding(format!(
                "expected {} bytes, got {}",
                expected,
                bytes.len()
            )));
        }
        Self::deserialize(bytes, params)
    }
}
