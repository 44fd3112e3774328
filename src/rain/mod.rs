//! The Rain block cipher over GF(2^256), used as the one-way function that maps
//! a secret key to its public key and as the core of the ring tree commitment.
//!
//! Rain_k(m): x = m; for each round i: x = (x + k + c_i)^(-1), followed by the
//! linear layer M_i in every round but the last; the output is x + k.

mod matrix;

use ark_std::{end_timer, start_timer};
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use crate::field::Gf256;
use crate::random_oracle::{Domain, RandomOracle};
use crate::{LAMBDA_BYTES, RAIN_ROUNDS};

pub use matrix::BitMatrix;

/// Round constants and linear layers of one Rain instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Rain {
    pub(crate) round_constants: [Gf256; RAIN_ROUNDS],
    pub(crate) matrices: Vec<BitMatrix>,
}

impl Default for Rain {
    fn default() -> Self {
        Self::new()
    }
}

impl Rain {
    /// Derive the constants from a fixed label. Linear layers are resampled
    /// until they are invertible.
    pub fn new() -> Self {
        let timer = start_timer!(|| "derive rain constants");
        let mut ro = RandomOracle::new(Domain::RainConstants);
        ro.update(b"rain-256");
        ro.update_u32(RAIN_ROUNDS as u32);
        let mut rng = ChaCha20Rng::from_seed(ro.finalize());

        let mut round_constants = [Gf256::ZERO; RAIN_ROUNDS];
        for c in round_constants.iter_mut() {
            let mut buf = [0u8; LAMBDA_BYTES];
            rng.fill_bytes(&mut buf);
            *c = Gf256::from(&buf);
        }

        let matrices = (0..RAIN_ROUNDS - 1)
            .map(|_| loop {
                let m = BitMatrix::rand(&mut rng);
                if m.is_invertible() {
                    break m;
                }
                log::debug!("rejected a singular rain matrix");
            })
            .collect();
        end_timer!(timer);

        Self {
            round_constants,
            matrices,
        }
    }

    /// Encrypt `msg` under `key`.
    pub fn encrypt(&self, key: &[u8; LAMBDA_BYTES], msg: &[u8; LAMBDA_BYTES]) -> [u8; LAMBDA_BYTES] {
        let (res, _) = self.encrypt_with_trace(&Gf256::from(key), &Gf256::from(msg));
        res.to_bytes()
    }

    /// Encrypt and also return the output of every sbox.
    pub(crate) fn encrypt_with_trace(
        &self,
        key: &Gf256,
        msg: &Gf256,
    ) -> (Gf256, [Gf256; RAIN_ROUNDS]) {
        let mut trace = [Gf256::ZERO; RAIN_ROUNDS];
        let mut state = *msg;
        for (round, out) in trace.iter_mut().enumerate() {
            state += *key + self.round_constants[round];
            *out = state.inverse();
            state = match self.matrices.get(round) {
                Some(m) => m.apply(out),
                None => *out,
            };
        }
        (state + *key, trace)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_rain_constants_are_fixed() {
        let a = Rain::new();
        let b = Rain::new();
        assert_eq!(a, b);
        assert_eq!(a.matrices.len(), RAIN_ROUNDS - 1);
        assert!(a.matrices.iter().all(|m| m.is_invertible()));
    }

    #[test]
    fn test_rain_trace() {
        let rain = Rain::new();
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        for _ in 0..5 {
            let key = Gf256::rand(&mut rng);
            let msg = Gf256::rand(&mut rng);
            let (out, trace) = rain.encrypt_with_trace(&key, &msg);

            // replay the rounds from the trace
            let mut state = msg;
            for (round, s) in trace.iter().enumerate() {
                let input = state + key + rain.round_constants[round];
                assert_eq!(input * *s, Gf256::ONE);
                state = if round + 1 < RAIN_ROUNDS {
                    rain.matrices[round].apply(s)
                } else {
                    *s
                };
            }
            assert_eq!(state + key, out);
            assert_eq!(rain.encrypt(&key.to_bytes(), &msg.to_bytes()), out.to_bytes());
        }
    }

    #[test]
    fn test_rain_key_sensitivity() {
        let rain = Rain::new();
        let msg = [0u8; 32];
        let mut key = [0xffu8; 32];
        let c0 = rain.encrypt(&key, &msg);
        key[31] ^= 1;
        let c1 = rain.encrypt(&key, &msg);
        assert_ne!(c0, c1);
    }
}
