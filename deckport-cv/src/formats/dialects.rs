//! Dialect definitions for the supported inventory tools
//!
//! Header sets transcribed from real exports of each tool. Strong
//! indicators are headers observed in that tool's exports and (nearly)
//! nowhere else; they dominate detection scoring.

use super::{DialectDefinition, Field, Quirks};

/// Build the full dialect catalog
pub fn all_dialects() -> Vec<DialectDefinition> {
    vec![
        DialectDefinition {
            id: "deckbox",
            display_name: "Deckbox",
            columns: &[
                (Field::Count, "Count"),
                (Field::Name, "Name"),
                (Field::Set, "Edition"),
                (Field::CollectorNumber, "Card Number"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
                (Field::Finish, "Foil"),
                (Field::Price, "My Price"),
            ],
            extra_headers: &[
                "Tradelist Count",
                "Signed",
                "Artist Proof",
                "Altered Art",
                "Misprint",
                "Promo",
                "Textless",
                "Printing Note",
            ],
            strong_indicators: &["Tradelist Count", "Artist Proof", "Textless"],
            delimiter: b',',
            quirks: Quirks {
                split_double_tokens: true,
                ..Quirks::default()
            },
            fallback: false,
        },
        DialectDefinition {
            id: "dragonshield",
            display_name: "Dragon Shield Card Manager",
            columns: &[
                (Field::Count, "Quantity"),
                (Field::Name, "Card Name"),
                (Field::Set, "Set Code"),
                (Field::SetName, "Set Name"),
                (Field::CollectorNumber, "Card Number"),
                (Field::Condition, "Condition"),
                (Field::Finish, "Printing"),
                (Field::Language, "Language"),
                (Field::Price, "Price Bought"),
            ],
            extra_headers: &["Folder Name", "Trade Quantity", "Date Bought"],
            strong_indicators: &["Folder Name", "Price Bought", "Trade Quantity"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "moxfield",
            display_name: "Moxfield",
            columns: &[
                (Field::Count, "Count"),
                (Field::Name, "Name"),
                (Field::Set, "Edition"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
                (Field::Finish, "Foil"),
                (Field::Tags, "Tags"),
                (Field::CollectorNumber, "Collector Number"),
                (Field::Price, "Purchase Price"),
            ],
            extra_headers: &["Tradelist Count", "Last Modified", "Alter", "Proxy"],
            strong_indicators: &["Last Modified", "Proxy"],
            delimiter: b',',
            quirks: Quirks {
                split_double_tokens: true,
                ..Quirks::default()
            },
            fallback: false,
        },
        DialectDefinition {
            id: "manabox",
            display_name: "ManaBox",
            columns: &[
                (Field::Name, "Name"),
                (Field::Set, "Set code"),
                (Field::SetName, "Set name"),
                (Field::CollectorNumber, "Collector number"),
                (Field::Finish, "Foil"),
                (Field::Count, "Quantity"),
                (Field::ScryfallId, "Scryfall ID"),
                (Field::Price, "Purchase price"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
            ],
            extra_headers: &[
                "Binder Name",
                "Binder Type",
                "Rarity",
                "ManaBox ID",
                "Misprint",
                "Altered",
                "Purchase price currency",
            ],
            strong_indicators: &["ManaBox ID", "Binder Type"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "archidekt",
            display_name: "Archidekt",
            columns: &[
                (Field::Count, "Quantity"),
                (Field::Name, "Name"),
                (Field::Finish, "Finish"),
                (Field::Condition, "Condition"),
                (Field::Set, "Edition Code"),
                (Field::SetName, "Edition Name"),
                (Field::MultiverseId, "Multiverse Id"),
                (Field::ScryfallId, "Scryfall ID"),
                (Field::Language, "Language"),
                (Field::Price, "Price"),
            ],
            extra_headers: &["Date Added", "Categories"],
            strong_indicators: &["Edition Code", "Edition Name", "Date Added"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "tappedout",
            display_name: "TappedOut",
            columns: &[
                (Field::Count, "Qty"),
                (Field::Name, "Name"),
                (Field::Set, "Printing"),
                (Field::Finish, "Foil"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
            ],
            extra_headers: &["Board", "Alter", "Signed"],
            strong_indicators: &["Board"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "tcgplayer",
            display_name: "TCGplayer App",
            columns: &[
                (Field::Count, "Quantity"),
                (Field::Name, "Name"),
                (Field::SetName, "Set"),
                (Field::Set, "Set Code"),
                (Field::CollectorNumber, "Card Number"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
                (Field::Finish, "Printing"),
                (Field::Price, "Price Each"),
            ],
            extra_headers: &["Simple Name", "Rarity", "Product ID", "SKU"],
            strong_indicators: &["Simple Name", "Product ID", "SKU"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "cardkingdom",
            display_name: "Card Kingdom",
            columns: &[
                (Field::Name, "title"),
                (Field::Set, "edition"),
                (Field::Finish, "foil"),
                (Field::Count, "quantity"),
            ],
            extra_headers: &[],
            strong_indicators: &["title"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "delverlens",
            display_name: "Delver Lens",
            columns: &[
                (Field::Count, "Quantity"),
                (Field::Name, "Name"),
                (Field::Set, "Edition"),
                (Field::CollectorNumber, "Collector Number"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
                (Field::Finish, "Foil"),
                (Field::ScryfallId, "Scryfall ID"),
            ],
            extra_headers: &[],
            strong_indicators: &["Scryfall ID"],
            delimiter: b',',
            quirks: Quirks {
                split_double_tokens: true,
                ..Quirks::default()
            },
            fallback: false,
        },
        DialectDefinition {
            id: "aetherhub",
            display_name: "AetherHub",
            columns: &[
                (Field::Count, "Qty"),
                (Field::Name, "Card Name"),
                (Field::Set, "Set Code"),
                (Field::SetName, "Set Name"),
                (Field::Condition, "Condition"),
                (Field::Finish, "Printing"),
                (Field::Language, "Language"),
            ],
            extra_headers: &["Date Obtained", "Tradelist"],
            strong_indicators: &["Date Obtained"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "mtggoldfish",
            display_name: "MTGGoldfish",
            columns: &[
                (Field::Name, "Card"),
                (Field::Set, "Set ID"),
                (Field::SetName, "Set Name"),
                (Field::Count, "Quantity"),
                (Field::Finish, "Foil"),
            ],
            extra_headers: &["Variation"],
            strong_indicators: &["Set ID", "Variation"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "deckstats",
            display_name: "Deckstats",
            columns: &[
                (Field::Count, "amount"),
                (Field::Name, "card_name"),
                (Field::Finish, "is_foil"),
                (Field::Set, "set_id"),
                (Field::CollectorNumber, "collector_number"),
                (Field::Condition, "condition"),
                (Field::Language, "language"),
            ],
            extra_headers: &["is_pinned", "is_signed", "comment"],
            strong_indicators: &["amount", "is_pinned", "is_foil"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "echomtg",
            display_name: "EchoMTG",
            columns: &[
                (Field::Count, "Reg Qty"),
                (Field::Name, "Name"),
                (Field::SetName, "Set"),
                (Field::Language, "Language"),
                (Field::Price, "Acquired Price"),
            ],
            extra_headers: &["Foil Qty", "Acquired Date"],
            strong_indicators: &["Reg Qty", "Foil Qty"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "urzagatherer",
            display_name: "UrzaGatherer",
            columns: &[
                (Field::Count, "Count"),
                (Field::Name, "Name"),
                (Field::SetName, "Set Name"),
                (Field::Set, "Set Code"),
                (Field::CollectorNumber, "Number"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
                (Field::Finish, "Foil"),
                (Field::Price, "Price"),
            ],
            extra_headers: &["Etched", "Artist", "Rarity"],
            strong_indicators: &["Etched"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "helvault",
            display_name: "Helvault",
            columns: &[
                (Field::Name, "name"),
                (Field::Set, "set_code"),
                (Field::SetName, "set_name"),
                (Field::CollectorNumber, "collector_number"),
                (Field::Language, "language"),
                (Field::Count, "quantity"),
                (Field::ScryfallId, "scryfall_id"),
                (Field::Extras, "extras"),
            ],
            extra_headers: &["oracle_id", "estimated_price"],
            strong_indicators: &["extras", "oracle_id"],
            delimiter: b',',
            quirks: Quirks {
                composite_extras: true,
                trim_long_ids: true,
                split_double_tokens: true,
            },
            fallback: false,
        },
        DialectDefinition {
            id: "mtgstudio",
            display_name: "MTG Studio",
            columns: &[
                (Field::Count, "Qty"),
                (Field::Name, "Name"),
                (Field::Set, "Edition"),
                (Field::Condition, "Condition"),
                (Field::Finish, "Foil"),
                (Field::Language, "Language"),
                (Field::Price, "Price"),
            ],
            extra_headers: &["Used", "Rarity"],
            strong_indicators: &["Used"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "cubecobra",
            display_name: "CubeCobra",
            columns: &[
                (Field::Name, "name"),
                (Field::Set, "Set"),
                (Field::CollectorNumber, "Collector Number"),
                (Field::Finish, "Finish"),
                (Field::Tags, "tags"),
            ],
            extra_headers: &[
                "CMC",
                "Type",
                "Color",
                "Rarity",
                "status",
                "maybeboard",
                "image URL",
            ],
            strong_indicators: &["maybeboard", "CMC"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "cardcastle",
            display_name: "CardCastle",
            columns: &[
                (Field::Name, "Card Name"),
                (Field::SetName, "Set"),
                (Field::CollectorNumber, "Number"),
                (Field::Finish, "Foil"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
                (Field::Count, "Count"),
                (Field::MultiverseId, "Multiverse ID"),
            ],
            extra_headers: &["CardCastle ID"],
            strong_indicators: &["CardCastle ID"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "pucatrade",
            display_name: "PucaTrade",
            columns: &[
                (Field::Count, "Count"),
                (Field::Name, "Name"),
                (Field::SetName, "Expansion"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
                (Field::Finish, "Foil"),
            ],
            extra_headers: &["PucaPoints"],
            strong_indicators: &["PucaPoints"],
            delimiter: b',',
            quirks: Quirks::default(),
            fallback: false,
        },
        DialectDefinition {
            id: "generic",
            display_name: "Generic CSV",
            columns: &[
                (Field::Count, "Quantity"),
                (Field::Name, "Name"),
                (Field::Set, "Set"),
                (Field::SetName, "Set Name"),
                (Field::CollectorNumber, "Collector Number"),
                (Field::Condition, "Condition"),
                (Field::Language, "Language"),
                (Field::Finish, "Foil"),
                (Field::Price, "Price"),
                (Field::Tags, "Tags"),
                (Field::ScryfallId, "Scryfall ID"),
                (Field::MultiverseId, "Multiverse ID"),
            ],
            extra_headers: &[],
            strong_indicators: &[],
            delimiter: b',',
            quirks: Quirks {
                split_double_tokens: true,
                ..Quirks::default()
            },
            fallback: true,
        },
    ]
}
