use std::ops::BitXor;

use crate::circuit::{ProofTape, TapeValue};
use crate::field::Gf256;
use crate::witness::Witness;
use crate::{ELL, LAMBDA};

/// A committed value held by the prover.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct ProverValue {
    w: Gf256,
    v: Gf256,
}

impl BitXor for ProverValue {
    type Output = Self;

    fn bitxor(self, other: Self) -> Self {
        Self {
            w: self.w + other.w,
            v: self.v + other.v,
        }
    }
}

impl TapeValue for ProverValue {
    fn mul_x(&self) -> Self {
        Self {
            w: self.w.mul_x(),
            v: self.v.mul_x(),
        }
    }
}

pub(crate) struct ProverTape<'a> {
    witness: &'a Witness,
    v_rows: &'a [Gf256],
    chall: Gf256,
    chi: Gf256,
    a0: Gf256,
    a1: Gf256,
}

impl<'a> ProverTape<'a> {
    pub(crate) fn new(witness: &'a Witness, v_rows: &'a [Gf256], chall_2: &[u8; 32]) -> Self {
        Self {
            witness,
            v_rows,
            chall: Gf256::from(chall_2),
            chi: Gf256::ONE,
            a0: Gf256::ZERO,
            a1: Gf256::ZERO,
        }
    }

    /// Returns `(a_tilde, b_tilde)`. `u_mask` packs the VOLE `u` bits of the
    /// mask rows.
    pub(crate) fn finalize(self, u_mask: &Gf256) -> (Gf256, Gf256) {
        let v_mask = Gf256::combine(self.v_rows[ELL..ELL + LAMBDA].iter().copied());
        (self.a1 + *u_mask, self.a0 + v_mask)
    }
}

impl<'a> ProofTape for ProverTape<'a> {
    type Value = ProverValue;

    fn committed(&self, pos: usize) -> ProverValue {
        ProverValue {
            w: Gf256::ONE.scale(self.witness.bit(pos) as u64),
            v: self.v_rows[pos],
        }
    }

    fn constant(&self, c: &Gf256) -> ProverValue {
        ProverValue {
            w: *c,
            v: Gf256::ZERO,
        }
    }

    fn assert_product(&mut self, x: ProverValue, y: ProverValue, z: ProverValue) {
        self.chi *= self.chall;
        self.a0 += self.chi * (x.v * y.v);
        self.a1 += self.chi * (x.v * y.w + x.w * y.v + z.v);
    }
}

pub(crate) struct VerifierTape<'a> {
    q_rows: &'a [Gf256],
    delta: Gf256,
    chall: Gf256,
    chi: Gf256,
    b: Gf256,
}

impl<'a> VerifierTape<'a> {
    /// `q_rows` below `ELL` must already carry the witness correction `d`.
    pub(crate) fn new(q_rows: &'a [Gf256], delta: Gf256, chall_2: &[u8; 32]) -> Self {
        Self {
            q_rows,
            delta,
            chall: Gf256::from(chall_2),
            chi: Gf256::ONE,
            b: Gf256::ZERO,
        }
    }

    /// The `b_tilde` an honest prover must have sent along with `a_tilde`.
    pub(crate) fn finalize(self, a_tilde: &Gf256) -> Gf256 {
        let q_mask = Gf256::combine(self.q_rows[ELL..ELL + LAMBDA].iter().copied());
        self.b + q_mask + *a_tilde * self.delta
    }
}

impl<'a> ProofTape for VerifierTape<'a> {
    type Value = Gf256;

    fn committed(&self, pos: usize) -> Gf256 {
        self.q_rows[pos]
    }

    fn constant(&self, c: &Gf256) -> Gf256 {
        *c * self.delta
    }

    fn assert_product(&mut self, x: Gf256, y: Gf256, z: Gf256) {
        self.chi *= self.chall;
        self.b += self.chi * (x * y + z * self.delta);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::circuit::ring_membership;
    use crate::witness::gen_witness;
    use crate::{KeyMaterial, ParamSet, RainRingParam, ELL_HAT};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    /// A VOLE for `witness` followed by random mask bits: returns
    /// `(u_mask, v_rows, q_rows)`.
    fn fake_vole<R: Rng>(
        rng: &mut R,
        witness: &Witness,
        delta: &Gf256,
    ) -> (Gf256, Vec<Gf256>, Vec<Gf256>) {
        let u_mask = Gf256::rand(rng);
        let v_rows: Vec<Gf256> = (0..ELL_HAT).map(|_| Gf256::rand(rng)).collect();
        let q_rows = v_rows
            .iter()
            .enumerate()
            .map(|(r, v)| {
                let u = if r < ELL {
                    witness.bit(r) as u64
                } else if r < ELL + LAMBDA {
                    u_mask.bit(r - ELL)
                } else {
                    rng.gen::<u64>() & 1
                };
                *v + delta.scale(u)
            })
            .collect();
        (u_mask, v_rows, q_rows)
    }

    fn prove_and_check(witness: &Witness, pp: &RainRingParam, root: &[u8; 32]) -> bool {
        let mut rng = ChaCha20Rng::from_seed([0u8; 32]);
        let delta = Gf256::rand(&mut rng);
        let chall_2 = [0x5au8; 32];
        let (u_mask, v_rows, q_rows) = fake_vole(&mut rng, witness, &delta);

        let mut prover = ProverTape::new(witness, &v_rows, &chall_2);
        ring_membership(&mut prover, &pp.rain, root);
        let (a_tilde, b_tilde) = prover.finalize(&u_mask);

        let mut verifier = VerifierTape::new(&q_rows, delta, &chall_2);
        ring_membership(&mut verifier, &pp.rain, root);
        verifier.finalize(&a_tilde) == b_tilde
    }

    #[test]
    fn test_quicksilver_accepts_honest_prover() {
        let pp = RainRingParam::new(ParamSet::default()).unwrap();
        let keys = KeyMaterial::with_default_keys(&pp).unwrap();
        for index in [0, 3, 7] {
            let witness = gen_witness(&keys, &pp.rain, index);
            assert!(prove_and_check(&witness, &pp, keys.public().root()));
        }
    }

    #[test]
    fn test_quicksilver_rejects_false_statement() {
        let pp = RainRingParam::new(ParamSet::default()).unwrap();
        let keys = KeyMaterial::with_default_keys(&pp).unwrap();
        let witness = gen_witness(&keys, &pp.rain, 1);
        assert!(!prove_and_check(&witness, &pp, &[3u8; 32]));

        // a committed key bit that does not satisfy the circuit
        let mut wrong = gen_witness(&keys, &pp.rain, 1);
        let flipped = wrong.bit(40) ^ 1;
        wrong.writer().set_bit(40, flipped);
        assert!(!prove_and_check(&wrong, &pp, keys.public().root()));
    }
}
