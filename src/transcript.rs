use zeroize::Zeroizing;

use crate::random_oracle::{Domain, RandomOracle};
use crate::tree::TreeNode;
use crate::veccom::Seed;
use crate::{KeyMaterial, IV_SIZE, LAMBDA_BYTES};

pub(crate) type Digest = [u8; LAMBDA_BYTES];

/// mu = H(pk_0 || ... || pk_7 || |msg| || msg)
pub(crate) fn hash_pk_msg(pkeys: &[TreeNode], msg: &[u8]) -> Digest {
    let mut ro = RandomOracle::new(Domain::PkMsg);
    pkeys.iter().for_each(|pk| {
        ro.update(pk);
    });
    ro.update((msg.len() as u64).to_le_bytes()).update(msg);
    ro.finalize()
}

/// Derive the root key of the seed trees and the IV.
///
/// The secret key is picked with a scan over every slot, so the access pattern
/// does not depend on `index`. `rho` is fresh randomness of the signer.
pub(crate) fn gen_rootkey_iv(
    keys: &KeyMaterial,
    index: usize,
    mu: &Digest,
    rho: &[u8; LAMBDA_BYTES],
) -> (Zeroizing<Seed>, [u8; IV_SIZE]) {
    let sk = keys.select_secret(index);
    let mut ro = RandomOracle::new(Domain::RootKey);
    ro.update(&*sk).update(mu).update(rho);
    let rootkey = Zeroizing::new(ro.finalize());

    let mut ro = RandomOracle::new(Domain::Iv);
    ro.update(mu).update(&*rootkey);
    let mut iv = [0u8; IV_SIZE];
    iv.copy_from_slice(&ro.finalize()[..IV_SIZE]);
    (rootkey, iv)
}

/// Root seed of the GGM tree of repetition `rep`.
pub(crate) fn repetition_seed(rootkey: &Seed, iv: &[u8; IV_SIZE], rep: usize) -> Seed {
    let mut ro = RandomOracle::new(Domain::RepetitionSeed);
    ro.update(rootkey).update(iv).update_u32(rep as u32);
    ro.finalize()
}

/// hcom = H(h_0 || ... || h_{tau-1})
pub(crate) fn hash_hcom(h: &[Seed]) -> Digest {
    let mut ro = RandomOracle::new(Domain::Hcom);
    h.iter().for_each(|x| {
        ro.update(x);
    });
    ro.finalize()
}

pub(crate) fn hash_challenge_1(
    mu: &Digest,
    hcom: &Digest,
    c: &[Vec<u8>],
    iv: &[u8; IV_SIZE],
    ell: usize,
    tau: usize,
) -> Digest {
    let mut ro = RandomOracle::new(Domain::Challenge1);
    ro.update(mu).update(hcom);
    c.iter().for_each(|ci| {
        ro.update(ci);
    });
    ro.update(iv).update_u32(ell as u32).update_u32(tau as u32);
    ro.finalize()
}

pub(crate) fn hash_challenge_2(
    chall_1: &Digest,
    u_tilde: &[u8; LAMBDA_BYTES],
    h_v: &Digest,
    d: &[u8],
) -> Digest {
    let mut ro = RandomOracle::new(Domain::Challenge2);
    ro.update(chall_1).update(u_tilde).update(h_v).update(d);
    ro.finalize()
}

pub(crate) fn hash_challenge_3(
    chall_2: &Digest,
    a_tilde: &[u8; LAMBDA_BYTES],
    b_tilde: &[u8; LAMBDA_BYTES],
) -> Digest {
    let mut ro = RandomOracle::new(Domain::Challenge3);
    ro.update(chall_2).update(a_tilde).update(b_tilde);
    ro.finalize()
}

/// Read `len` bits starting at `offset` from a challenge, least significant
/// bit first.
pub(crate) fn challenge_bits(chall: &Digest, offset: usize, len: usize) -> usize {
    (0..len).fold(0, |acc, b| {
        let i = offset + b;
        acc | ((((chall[i >> 3] >> (i & 7)) & 1) as usize) << b)
    })
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{ParamSet, RainRingParam, DEFAULT_SECRET_KEYS, ELL, KEY_NUM};

    #[test]
    fn test_mu_binds_every_key_and_message() {
        let pkeys: Vec<TreeNode> = (0..KEY_NUM).map(|i| [i as u8; 32]).collect();
        let mu = hash_pk_msg(&pkeys, b"test");
        assert_eq!(mu, hash_pk_msg(&pkeys, b"test"));
        assert_ne!(mu, hash_pk_msg(&pkeys, b"tset"));
        assert_ne!(mu, hash_pk_msg(&pkeys, b""));

        // changing a single key changes mu
        for i in 0..KEY_NUM {
            let mut changed = pkeys.clone();
            changed[i][31] ^= 1;
            assert_ne!(mu, hash_pk_msg(&changed, b"test"));
        }

        // swapping any two keys changes mu
        for i in 0..KEY_NUM {
            for j in i + 1..KEY_NUM {
                let mut swapped = pkeys.clone();
                swapped.swap(i, j);
                assert_ne!(mu, hash_pk_msg(&swapped, b"test"));
            }
        }
    }

    #[test]
    fn test_rootkey_iv() {
        let pp = RainRingParam::new(ParamSet::default()).unwrap();
        let keys = KeyMaterial::with_default_keys(&pp).unwrap();
        let mu = [1u8; 32];
        let rho = [2u8; 32];

        let (rk3, iv3) = gen_rootkey_iv(&keys, 3, &mu, &rho);
        let (rk3_again, iv3_again) = gen_rootkey_iv(&keys, 3, &mu, &rho);
        assert_eq!(*rk3, *rk3_again);
        assert_eq!(iv3, iv3_again);

        // the selected key is the one in slot 3
        let mut ro = RandomOracle::new(Domain::RootKey);
        ro.update(DEFAULT_SECRET_KEYS[3]).update(mu).update(rho);
        assert_eq!(*rk3, ro.finalize());

        let (rk4, _) = gen_rootkey_iv(&keys, 4, &mu, &rho);
        assert_ne!(*rk3, *rk4);
        let (rk3_fresh, iv3_fresh) = gen_rootkey_iv(&keys, 3, &mu, &[3u8; 32]);
        assert_ne!(*rk3, *rk3_fresh);
        assert_ne!(iv3, iv3_fresh);
    }

    #[test]
    fn test_challenges() {
        let mu = [0u8; 32];
        let hcom = [1u8; 32];
        let iv = [2u8; IV_SIZE];
        let c = vec![vec![3u8; 10], vec![4u8; 10]];
        let chall_1 = hash_challenge_1(&mu, &hcom, &c, &iv, ELL, 3);
        assert_ne!(chall_1, hash_challenge_1(&mu, &hcom, &c, &iv, ELL, 4));
        assert_ne!(chall_1, hash_challenge_1(&mu, &hcom, &c[..1], &iv, ELL, 3));

        let chall_2 = hash_challenge_2(&chall_1, &[5u8; 32], &[6u8; 32], &[7u8; 4]);
        assert_ne!(chall_2, hash_challenge_2(&chall_1, &[5u8; 32], &[6u8; 32], &[7u8; 5]));
        let chall_3 = hash_challenge_3(&chall_2, &[8u8; 32], &[9u8; 32]);
        assert_ne!(chall_3, hash_challenge_3(&chall_2, &[9u8; 32], &[8u8; 32]));
    }

    #[test]
    fn test_challenge_bits() {
        let mut chall = [0u8; 32];
        chall[0] = 0b1011_0110;
        chall[1] = 0b0000_0001;
        assert_eq!(challenge_bits(&chall, 0, 8), 0b1011_0110);
        assert_eq!(challenge_bits(&chall, 1, 3), 0b011);
        assert_eq!(challenge_bits(&chall, 4, 5), 0b1_1011);
        assert_eq!(challenge_bits(&chall, 16, 12), 0);

        // consecutive ranges partition the challenge
        let chall = [0xa5u8; 32];
        let pp = ParamSet::new(256, 9, 7, 16, 16, 32).unwrap();
        let mut acc = 0u32;
        for rep in 0..pp.tau {
            acc += challenge_bits(&chall, pp.bit_offset(rep), pp.k(rep)).count_ones();
        }
        assert_eq!(acc, 32 * 4);
    }
}
