use anyhow::{bail, ensure, Result};
use clap::Args;
use wallet_ledger::{KeyPrimitives, PublicKeys, Wallet, WalletKeys};

use super::common::{parse_hex_array, WalletFile};

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Private view key hex (32 bytes).
    #[arg(long)]
    pub view_secret: String,

    /// Private spend key hex. Omit for a view-only wallet.
    #[arg(long, conflicts_with = "spend_public")]
    pub spend_secret: Option<String>,

    /// Public spend key hex, required for a view-only wallet.
    #[arg(long)]
    pub spend_public: Option<String>,

    /// Height the wallet was created at.
    #[arg(long, default_value_t = 0)]
    pub creation_height: u64,

    /// Replace an existing wallet file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(file: &WalletFile, args: InitArgs) -> Result<()> {
    ensure!(
        args.force || !file.store().exists(),
        "wallet {} already exists; pass --force to replace it",
        file.path.display()
    );

    let primitives = file.primitives();
    let view_secret = parse_hex_array::<32>(&args.view_secret, "view secret")?;
    let keys = match (&args.spend_secret, &args.spend_public) {
        (Some(spend), _) => WalletKeys::from_secrets(
            &primitives,
            parse_hex_array(spend, "spend secret")?,
            view_secret,
        )?,
        (None, Some(spend_public)) => WalletKeys::view_only(
            view_secret,
            PublicKeys {
                spend: parse_hex_array(spend_public, "spend public key")?,
                view: primitives.secret_to_public(&view_secret)?,
            },
        ),
        (None, None) => bail!("pass --spend-secret, or --spend-public for a view-only wallet"),
    };

    let mut wallet = Wallet::new(keys, primitives);
    wallet.set_creation_height(args.creation_height);
    let address = wallet.public_address()?;
    file.save(&mut wallet)?;

    println!("address={address}");
    println!("view_only={}", wallet.is_view_only());
    println!("creation_height={}", wallet.creation_height());
    Ok(())
}
