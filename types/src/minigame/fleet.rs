use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ShipTemplate {
    pub name: &'static str,
    pub size: u8,
}

/// Standard fleet placed on every Battleship board.
pub const FLEET: [ShipTemplate; 5] = [
    ShipTemplate {
        name: "Carrier",
        size: 5,
    },
    ShipTemplate {
        name: "Battleship",
        size: 4,
    },
    ShipTemplate {
        name: "Cruiser",
        size: 3,
    },
    ShipTemplate {
        name: "Submarine",
        size: 3,
    },
    ShipTemplate {
        name: "Destroyer",
        size: 2,
    },
];

/// Cells occupied by a full fleet.
pub const FLEET_CELLS: usize = 17;
