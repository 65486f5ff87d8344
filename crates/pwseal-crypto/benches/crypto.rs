use pwseal_crypto::{
    derive_key, generate_nonce, open, pad, seal, unpad, DerivedKey, KdfParams, KEY_SIZE,
    SALT_SIZE,
};

fn make_data(size: usize) -> Vec<u8> {
    (0..size)
        .map(|i| (i.wrapping_mul(7) ^ (i >> 3)) as u8)
        .collect()
}

#[divan::bench(args = [1_000, 10_000, 100_000])]
fn bench_derive_key(bencher: divan::Bencher, iterations: u32) {
    let params = KdfParams::with_iterations(iterations);
    let salt = [0x11u8; SALT_SIZE];
    bencher.bench(|| {
        derive_key(
            divan::black_box(b"benchmark passphrase"),
            divan::black_box(&salt),
            &params,
        )
        .unwrap()
    });
}

#[divan::bench(args = [1024, 32768, 1048576])]
fn bench_seal(bencher: divan::Bencher, size: usize) {
    let key = DerivedKey::from_bytes([0xABu8; KEY_SIZE]);
    let data = pad(&make_data(size), 16).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            let nonce = generate_nonce();
            seal(divan::black_box(&key), &nonce, divan::black_box(&data)).unwrap()
        });
}

#[divan::bench(args = [1024, 32768, 1048576])]
fn bench_open(bencher: divan::Bencher, size: usize) {
    let key = DerivedKey::from_bytes([0xABu8; KEY_SIZE]);
    let nonce = generate_nonce();
    let data = pad(&make_data(size), 16).unwrap();
    let (ciphertext, tag) = seal(&key, &nonce, &data).unwrap();
    bencher
        .counter(divan::counter::BytesCount::new(size))
        .bench(|| {
            let padded = open(
                divan::black_box(&key),
                &nonce,
                divan::black_box(&ciphertext),
                &tag,
            )
            .unwrap();
            unpad(&padded).unwrap().len()
        });
}

fn main() {
    divan::main();
}
