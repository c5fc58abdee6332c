use assert_cmd::Command;

const SHA256_OF_ABC: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

#[test]
fn test_cli_version_parameter() {
    let mut cmd = Command::cargo_bin("tpmcred").unwrap();
    cmd.arg("--version").assert().success();
}

#[test]
fn test_cli_info_prints_public_area() {
    let mut cmd = Command::cargo_bin("tpmcred").unwrap();
    let output = cmd.args(["info", "--bits", "1024"]).output().unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("algorithm:  RSA"), "stdout: {}", stdout);
    assert!(stdout.contains("key bits:   1024"), "stdout: {}", stdout);
    assert!(stdout.contains("exponent:   65537"), "stdout: {}", stdout);
}

#[test]
fn test_cli_sign_outputs_hex_signature() {
    for pss in [false, true] {
        let mut cmd = Command::cargo_bin("tpmcred").unwrap();
        cmd.args(["sign", "--bits", "1024", "--hash", "sha256", "--digest", SHA256_OF_ABC]);
        if pss {
            cmd.arg("--pss");
        }
        let output = cmd.output().unwrap();

        assert!(output.status.success(), "pss={}", pss);
        let signature = String::from_utf8_lossy(&output.stdout);
        let signature = signature.trim();
        assert_eq!(signature.len(), 256, "1024-bit signature is 128 bytes");
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));
    }
}

#[test]
fn test_cli_sign_pss_sha512_with_small_key() {
    let digest = "ab".repeat(64);
    let mut cmd = Command::cargo_bin("tpmcred").unwrap();
    let output = cmd
        .args(["sign", "--bits", "1024", "--hash", "sha512", "--pss", "--digest", &digest])
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim().len(), 256);
}

#[test]
fn test_cli_sign_rejects_wrong_digest_length() {
    let mut cmd = Command::cargo_bin("tpmcred").unwrap();
    let output = cmd
        .args(["sign", "--bits", "1024", "--hash", "sha384", "--digest", SHA256_OF_ABC])
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("digest size mismatch"), "stderr: {}", stderr);
}

#[test]
fn test_cli_sign_rejects_bad_hex() {
    let mut cmd = Command::cargo_bin("tpmcred").unwrap();
    cmd.args(["sign", "--digest", "not-hex"]).assert().failure();
}
