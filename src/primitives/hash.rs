//! Default hash primitives: SHA-256/512 (`sha2`) and BLAKE2s/BLAKE2b
//! (`blake2`), each paired with an HMAC construction from the `hmac` crate.

use hmac::{Hmac, Mac};

use super::Hash;

macro_rules! hash_impl {
    ($struct_name:ident, $digest:ty, $name:expr, $hashlen:expr, $blocklen:expr) => {
        #[derive(Default)]
        pub struct $struct_name;

        impl Hash for $struct_name {
            fn name(&self) -> &'static str {
                $name
            }

            fn hashlen(&self) -> usize {
                $hashlen
            }

            fn blocklen(&self) -> usize {
                $blocklen
            }

            fn hash(&self, data: &[u8]) -> Vec<u8> {
                use digest::Digest;
                <$digest>::digest(data).to_vec()
            }

            fn hmac(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
                let mut mac = Hmac::<$digest>::new_varkey(key).expect("hmac accepts any key length");
                mac.input(data);
                mac.result().code().to_vec()
            }
        }
    };
}

hash_impl!(HashSha256, sha2::Sha256, "SHA256", 32, 64);
hash_impl!(HashSha512, sha2::Sha512, "SHA512", 64, 128);
hash_impl!(HashBlake2s, blake2::Blake2s, "BLAKE2s", 32, 64);
hash_impl!(HashBlake2b, blake2::Blake2b, "BLAKE2b", 64, 128);
