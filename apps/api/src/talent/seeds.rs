//! Seed lists for the leaderboard: wallets and identities registered for the Mantle cohort.

/// Wallets searched with an exact match.
pub const WALLET_ADDRESSES: &[&str] = &[
    "0x57F9a9C5b176196C713eBC5b314D34F2a769a54F",
    "0xb9f75cB1B7eC69529190d973eB12D796236a0E90",
    "0x53b47dce7c3e50caa47ee51031b24a85b49f1fff",
    "0xe8ce8754c42dfffeb59f8d074a0f702970a2d4af",
    "0x358e25cd4d7631eb874d25f4e1ae4a14b0abb56e",
    "0xc93943a414788c8010bcecd7650d4acf6967604e",
    "0xc095c7cA2B56b0F0DC572d5d4A9Eb1B37f4306a0",
    "0xbeef89a4aec71369e900e394ba828fba3b17f6c6",
    "0x8441021bfe1B7B06cC3cB53FA71370583CF3f523",
    "0x758bD5962a4228f79A98cFc682Dedc040c1CcDFb",
    "0x432795ea5aCbC944c3df02868e0CCDC58cA98DD5",
    "0x0fCe963885b15a12832813798980bDadc9744705",
    "0x4e92b60150ca2d39dd2ff41618dd4def1def1ed9",
    "0xBe76b786E4D9A6039B9e9F188e0ee0a955Cae5C8",
    "0xA0701444c0813AD0e52b69804EDF130937A7616F",
    "0x8513A856a88e63374286d0116C192733444894C0",
    "0xe7318D913b19396f6BDec87f664f0233414AeE7f",
    "0x8bCcD9FF941b08f3C06E255659596654b228eade",
    "0x229fDD5d360aB35231F1d113EE3bA05f6075dCe3",
    "0x9CA25259DAde7Bce58e5294A8F08CAA69fD59f6D",
    "0x3741D382D540248a1D47b8d3f524d31A7FBd5481",
    "0xbF2E37A9805bf0f33C5F82f8d3f3D3931b189bAC",
    "0xB38D87531f7D79Aad063A1b3F0A3b44ee244ce42",
    "0xB6E9874752Ad5370B42aA4be6593a1c86D15A82e",
    "0xF835C816cBd9ab18d35d01D1eEa5190ee308BB0f",
    "0x087a8382bc179f79f1c06ff91d9edd66985a9e59",
    "0x0993d39cefcd00d898ddfdf8807f832be3ae1d5a",
    "0xab53369e91dcFC275744DC0A30BD3E363B2785e0",
    "0x799C233F47B1Ffa09dF95F1e708816Bb4F16eF51",
    "0xE89fEf221bdEd027C4c9F07D256b9Dc1422A2455",
    "0xca85460d23Bfb2e0079bAb5AAC84921D9D0762a4",
    "0xbbaF587d7be29308A2340bC82418c89814D2CeE7",
    "0x8B24160a8138209128D46Cd0B019c19cB8f6e511",
    "0x55A5705453Ee82c742274154136Fce8149597058",
    "0xa235DC00B1d7501b919e27C2968999d4bCA5Bc3e",
    "0x5E2be9Eaaf551f1862585A7D1FFaE2B3D7fE212D",
    "0x09BB59c870AA5CB0e7A01b2f96d72B29f3a4BE90",
    "0xF9A56a259487c10948E3b9ddC7a9ba84C7e621aC",
    "0xDEd02370dC860c84e0D1E8b1BB8d789E9e76625F",
    "0x2189878C4963B84Fd737640db71D7650214c4A18",
    "0xe8771172D9a31C1572d7Ff85cd14422F03457198",
    "0xF507Baf56754091Fc700d3cac895F005AF446fF4",
    "0xd4C8c8778214E27065ee4ECfa9834BD533430cB3",
];

/// ENS names / identities searched one at a time.
pub const ENS_NAMES: &[&str] = &[
    "0xoucan",
    "akhilnanavati",
    "thefullstack",
    "0xgonzalo",
    "ariiellus",
    "fabit",
    "deca12x",
    "forestkeeperio",
    "raspc",
    "juliomcruz",
    "mati-os",
    "meximalist",
    "ozkite",
    "solsiete",
    "vixtorxva",
    "xfajarr",
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_wallets_are_well_formed() {
        assert_eq!(WALLET_ADDRESSES.len(), 43);
        for wallet in WALLET_ADDRESSES {
            assert_eq!(wallet.len(), 42, "{wallet}");
            assert!(wallet.starts_with("0x"));
            assert!(wallet[2..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[test]
    fn test_seed_lists_have_no_duplicates() {
        let wallets: HashSet<String> = WALLET_ADDRESSES.iter().map(|w| w.to_lowercase()).collect();
        assert_eq!(wallets.len(), WALLET_ADDRESSES.len());
        let names: HashSet<&str> = ENS_NAMES.iter().copied().collect();
        assert_eq!(names.len(), ENS_NAMES.len());
    }
}
