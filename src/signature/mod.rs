use ark_std::{end_timer, start_timer};
use rand::{CryptoRng, RngCore};
#[cfg(feature = "parallel")]
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

use crate::circuit::ring_membership;
use crate::field::Gf256;
use crate::quicksilver::{ProverTape, VerifierTape};
use crate::transcript::{
    challenge_bits, gen_rootkey_iv, hash_challenge_1, hash_challenge_2, hash_challenge_3,
    hash_hcom, hash_pk_msg, repetition_seed,
};
use crate::universal_hash::{hash_vole_check, vole_hash};
use crate::veccom::{AllButOneOpening, Seed};
use crate::vole::{correction, reconstruct_repetition, transpose, RepetitionVole};
use crate::witness::gen_witness;
use crate::{
    KeyMaterial, ParamSet, PublicKeySet, Rain, RainRingError, Result, RingSignature, ELL,
    ELL_BYTES, ELL_HAT_BYTES, IV_SIZE, KEY_NUM, LAMBDA, LAMBDA_BYTES,
};

mod serialize;

pub struct RainRing;

/// Public parameters: the parameter set and the Rain instance derived for it.
#[derive(Debug, Clone)]
pub struct RainRingParam {
    pub(crate) params: ParamSet,
    pub(crate) rain: Rain,
}

impl RainRingParam {
    pub fn new(params: ParamSet) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            rain: Rain::new(),
        })
    }

    pub fn params(&self) -> &ParamSet {
        &self.params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RainRingSignature {
    pub(crate) iv: [u8; IV_SIZE],
    pub(crate) chall_3: [u8; LAMBDA_BYTES],
    pub(crate) u_tilde: [u8; LAMBDA_BYTES],
    pub(crate) a_tilde: [u8; LAMBDA_BYTES],
    /// masked witness
    pub(crate) d: Vec<u8>,
    /// corrections of repetitions 1..tau
    pub(crate) c: Vec<Vec<u8>>,
    pub(crate) openings: Vec<AllButOneOpening>,
}

impl RainRingSignature {
    /// Check every length against the parameter set.
    pub(crate) fn is_well_formed(&self, params: &ParamSet) -> bool {
        self.d.len() == ELL_BYTES
            && self.c.len() == params.tau - 1
            && self.c.iter().all(|ci| ci.len() == ELL_HAT_BYTES)
            && self.openings.len() == params.tau
            && self
                .openings
                .iter()
                .enumerate()
                .all(|(i, o)| o.co_path.len() == params.k(i))
    }
}

impl RingSignature for RainRing {
    type Param = RainRingParam;
    type PK = PublicKeySet;
    type SK = KeyMaterial;
    type Signature = RainRingSignature;

    fn setup(params: ParamSet) -> Result<Self::Param> {
        RainRingParam::new(params)
    }

    fn key_gen<K: AsRef<[u8]>>(skeys: &[K], pp: &Self::Param) -> Result<(Self::PK, Self::SK)> {
        let timer = start_timer!(|| "RainRing key gen");
        let sk = KeyMaterial::new(skeys, pp)?;
        end_timer!(timer);
        Ok((sk.public().clone(), sk))
    }

    fn sign<R: RngCore + CryptoRng>(
        sk: &Self::SK,
        index: usize,
        message: &[u8],
        pp: &Self::Param,
        rng: &mut R,
    ) -> Result<Self::Signature> {
        if index >= KEY_NUM {
            return Err(RainRingError::InvalidIndex(index));
        }
        let timer = start_timer!(|| "RainRing signing");
        let params = &pp.params;

        let mu = hash_pk_msg(sk.public().public_keys(), message);
        let mut rho = Zeroizing::new([0u8; LAMBDA_BYTES]);
        rng.try_fill_bytes(&mut *rho)?;
        let (rootkey, iv) = gen_rootkey_iv(sk, index, &mu, &rho);

        // vector commitments and VOLE, one per repetition
        let vole_timer = start_timer!(|| format!("vole for {} repetitions", params.tau));
        let commit_repetition = |i: usize| {
            let seed = repetition_seed(&rootkey, &iv, i);
            RepetitionVole::commit(&seed, &iv, i, params.k(i))
        };
        #[cfg(feature = "parallel")]
        let reps: Vec<RepetitionVole> = (0..params.tau)
            .into_par_iter()
            .map(commit_repetition)
            .collect();
        #[cfg(not(feature = "parallel"))]
        let reps: Vec<RepetitionVole> = (0..params.tau).map(commit_repetition).collect();
        end_timer!(vole_timer);

        let u = &reps[0].u;
        let c: Vec<Vec<u8>> = reps.iter().skip(1).map(|r| correction(u, &r.u)).collect();
        let hs: Vec<Seed> = reps.iter().map(|r| r.h).collect();
        let hcom = hash_hcom(&hs);

        let witness = gen_witness(sk, &pp.rain, index);
        let chall_1 = hash_challenge_1(&mu, &hcom, &c, &iv, ELL, params.tau);

        // consistency of the repetitions
        let columns: Vec<&[u8]> = reps
            .iter()
            .flat_map(|r| r.v.iter().map(|col| col.as_slice()))
            .collect();
        debug_assert_eq!(columns.len(), LAMBDA);
        let u_tilde = vole_hash(&chall_1, u).to_bytes();
        let v_tilde: Vec<Gf256> = columns.iter().map(|col| vole_hash(&chall_1, col)).collect();
        let h_v = hash_vole_check(&v_tilde);
        let d: Vec<u8> = u[..ELL_BYTES]
            .iter()
            .zip(witness.as_bytes().iter())
            .map(|(a, b)| a ^ b)
            .collect();
        let chall_2 = hash_challenge_2(&chall_1, &u_tilde, &h_v, &d);

        // circuit
        let qs_timer = start_timer!(|| "quicksilver prover");
        let v_rows = transpose(&columns);
        let mut tape = ProverTape::new(&witness, &v_rows, &chall_2);
        ring_membership(&mut tape, &pp.rain, sk.public().root());
        let (a_tilde, b_tilde) = tape.finalize(&Gf256::from_slice(&u[ELL_BYTES..]));
        let a_tilde = a_tilde.to_bytes();
        let chall_3 = hash_challenge_3(&chall_2, &a_tilde, &b_tilde.to_bytes());
        end_timer!(qs_timer);

        let openings = reps
            .iter()
            .enumerate()
            .map(|(i, r)| r.open(challenge_bits(&chall_3, params.bit_offset(i), params.k(i))))
            .collect();

        let res = RainRingSignature {
            iv,
            chall_3,
            u_tilde,
            a_tilde,
            d,
            c,
            openings,
        };
        log::debug!("signature of {} bytes", RainRingSignature::byte_len(params));
        end_timer!(timer);
        Ok(res)
    }

    fn verify(pk: &Self::PK, message: &[u8], sig: &Self::Signature, pp: &Self::Param) -> bool {
        let timer = start_timer!(|| "RainRing verify");
        let params = &pp.params;
        if !sig.is_well_formed(params) {
            log::error!("signature does not match the parameter set");
            return false;
        }

        let mu = hash_pk_msg(pk.public_keys(), message);
        let delta = Gf256::from(&sig.chall_3);

        let vole_timer = start_timer!(|| format!("reconstruct {} repetitions", params.tau));
        let reconstruct = |i: usize| {
            let k = params.k(i);
            let delta_i = challenge_bits(&sig.chall_3, params.bit_offset(i), k);
            let c = if i == 0 {
                None
            } else {
                Some(sig.c[i - 1].as_slice())
            };
            reconstruct_repetition(&sig.openings[i], delta_i, c, &sig.iv, i, k)
        };
        #[cfg(feature = "parallel")]
        let reps: Option<Vec<(Vec<Vec<u8>>, Seed)>> = (0..params.tau)
            .into_par_iter()
            .map(reconstruct)
            .collect();
        #[cfg(not(feature = "parallel"))]
        let reps: Option<Vec<(Vec<Vec<u8>>, Seed)>> = (0..params.tau).map(reconstruct).collect();
        end_timer!(vole_timer);

        let reps = match reps {
            Some(reps) => reps,
            None => {
                log::error!("malformed seed tree opening");
                return false;
            }
        };

        let hs: Vec<Seed> = reps.iter().map(|(_, h)| *h).collect();
        let hcom = hash_hcom(&hs);
        let chall_1 = hash_challenge_1(&mu, &hcom, &sig.c, &sig.iv, ELL, params.tau);

        let columns: Vec<&[u8]> = reps
            .iter()
            .flat_map(|(q, _)| q.iter().map(|col| col.as_slice()))
            .collect();
        let u_tilde = Gf256::from(&sig.u_tilde);
        let v_tilde: Vec<Gf256> = columns
            .iter()
            .enumerate()
            .map(|(c, col)| vole_hash(&chall_1, col) + u_tilde.scale(delta.bit(c)))
            .collect();
        let h_v = hash_vole_check(&v_tilde);
        let chall_2 = hash_challenge_2(&chall_1, &sig.u_tilde, &h_v, &sig.d);

        let qs_timer = start_timer!(|| "quicksilver verifier");
        let mut q_rows = transpose(&columns);
        q_rows
            .iter_mut()
            .take(ELL)
            .enumerate()
            .for_each(|(r, q)| *q += delta.scale(((sig.d[r >> 3] >> (r & 7)) & 1) as u64));
        let mut tape = VerifierTape::new(&q_rows, delta, &chall_2);
        ring_membership(&mut tape, &pp.rain, pk.root());
        let b_tilde = tape.finalize(&Gf256::from(&sig.a_tilde));
        end_timer!(qs_timer);

        let chall_3 = hash_challenge_3(&chall_2, &sig.a_tilde, &b_tilde.to_bytes());
        let res: bool = chall_3[..].ct_eq(&sig.chall_3[..]).into();
        if !res {
            log::error!("challenge does not match the transcript");
        }
        end_timer!(timer);
        res
    }
}
