#![allow(dead_code)]

pub const TEST_EVENT_ID: &str = "E1";
pub const TEST_CONTRACT: &str = "5FHneW46xGXgs5mUiveU4sbTyGBzmstUspZC92UhjJM694ty";
pub const TEST_ORGANIZER: &str = "5FLSigC9HGRKVhB9FiEo4Y3koPsNmBmLJbpXg2mp1hXcS59Y";
pub const TEST_SIGNER_SEED: [u8; 32] = [9u8; 32];
pub const ALICE_WALLET: &str = "5GrwvaEF5zXb26Fz9rcQpDWS57CtERHpNehXCPcNoHGKutQY";
pub const BOB_WALLET: &str = "5DAAnrj7VHTznn2AWBemMuyBwZWs6FNFjdyVXUeYum3PTXFy";
