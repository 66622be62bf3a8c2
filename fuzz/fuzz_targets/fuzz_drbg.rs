#![no_main]
use libfuzzer_sys::fuzz_target;
use secmod_crypto::drbg::{CtrDrbg, SecurityStrength};
use secmod_crypto::entropy::{SystemEntropySource, TrngWorkBuff};

// Drive the DRBG through arbitrary KAT entropy/nonce/additional-input
// splits and request sizes; every shape must either work or fail cleanly.
fuzz_target!(|data: &[u8]| {
    if data.len() < 4 {
        return;
    }
    let (ctl, rest) = data.split_at(4);
    let strength = if ctl[0] & 1 == 0 {
        SecurityStrength::Aes128
    } else {
        SecurityStrength::Aes256
    };
    let entropy_len = (ctl[1] as usize) % (rest.len() + 1);
    let (entropy, rest) = rest.split_at(entropy_len);
    let nonce_len = (ctl[2] as usize) % (rest.len() + 1);
    let (nonce, add_input) = rest.split_at(nonce_len);

    let drbg = CtrDrbg::new(strength);
    let mut work = TrngWorkBuff::new();
    if drbg.enter_kat_mode(entropy, nonce, &mut work).is_err() {
        return;
    }
    let _ = drbg.add_additional_input(add_input);
    if drbg
        .instantiate(&mut SystemEntropySource, &mut work)
        .is_err()
    {
        return;
    }
    let _ = drbg.generate_bytes((ctl[3] as usize) * 7);
    let _ = drbg.generate_bytes(1);
    drbg.uninstantiate();
});
