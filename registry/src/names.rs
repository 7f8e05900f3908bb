//! Name lists for generated residents

use rand::Rng;

/// Common first names for males
const MALE_FIRST_NAMES: &[&str] = &[
    "Jose", "Juan", "Antonio", "Pedro", "Manuel", "Ramon", "Eduardo", "Roberto",
    "Ricardo", "Fernando", "Rodrigo", "Danilo", "Rogelio", "Ernesto", "Romeo",
    "Arnel", "Jericho", "Mark", "John Paul", "Christian", "Paolo", "Carlo", "Miguel",
    "Gabriel", "Rafael", "Andres", "Emilio", "Crisanto", "Teodoro", "Nestor",
];

/// Common first names for females
const FEMALE_FIRST_NAMES: &[&str] = &[
    "Maria", "Ana", "Rosario", "Teresita", "Josefina", "Corazon", "Luzviminda",
    "Marites", "Elena", "Cristina", "Leonora", "Imelda", "Erlinda", "Gloria",
    "Angelica", "Kristine", "Mary Grace", "Jasmine", "Camille", "Patricia",
    "Bea", "Andrea", "Nicole", "Princess", "Rowena", "Maricel", "Divina", "Lorna",
];

/// Common last names
const LAST_NAMES: &[&str] = &[
    "Santos", "Reyes", "Cruz", "Bautista", "Ocampo", "Garcia", "Mendoza", "Torres",
    "Tomas", "Andrada", "Castillo", "Flores", "Villanueva", "Ramos", "Castro",
    "Rivera", "Aquino", "Navarro", "Salazar", "Mercado", "Dela Cruz", "Gonzales",
    "Lopez", "Del Rosario", "Pascual", "Soriano", "Aguilar", "Manalo", "Dizon",
    "Lim", "Tan", "Domingo", "Valdez", "Fernandez", "Panganiban", "Macaraeg",
];

pub const STREETS: &[&str] = &[
    "Rizal St", "Mabini St", "Bonifacio Ave", "Luna St", "Del Pilar St",
    "Burgos St", "Quezon Blvd", "Sampaguita Rd", "Narra St", "Acacia Ln",
];

pub const RELIGIONS: &[&str] = &[
    "Roman Catholic", "Iglesia ni Cristo", "Islam", "Born Again Christian",
    "Seventh-day Adventist", "Aglipayan",
];

pub const OCCUPATIONS: &[&str] = &[
    "Teacher", "Vendor", "Driver", "Farmer", "Fisherman", "Nurse", "Carpenter",
    "Call Center Agent", "Sari-sari Store Owner", "Barangay Tanod", "Engineer",
];

/// Pick a random first name based on sex
pub fn random_first_name<R: Rng + ?Sized>(rng: &mut R, is_male: bool) -> &'static str {
    if is_male {
        pick(rng, MALE_FIRST_NAMES)
    } else {
        pick(rng, FEMALE_FIRST_NAMES)
    }
}

pub fn random_last_name<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(rng, LAST_NAMES)
}

pub fn pick<R: Rng + ?Sized>(rng: &mut R, list: &'static [&'static str]) -> &'static str {
    list[rng.gen_range(0..list.len())]
}
