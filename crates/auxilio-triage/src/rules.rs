//! The ordered triage rule table.
//!
//! Rule order encodes clinical urgency: airway, breathing, and circulation
//! life threats are checked before everything else, so an utterance that
//! mentions both an airway obstruction and a minor complaint resolves to the
//! obstruction. The order is part of the contract and must not be
//! rearranged.
//!
//! Two-tiered rules (chest pain, burns) refine severity within a category:
//! the outer trigger set selects the category, the first matching secondary
//! tier selects the response, and the last tier (empty trigger set) is the
//! category default.

use auxilio_types::Severity;

/// One severity tier within a rule. A tier with an empty trigger set is the
/// default for its category and must come last.
pub(crate) struct Tier {
    pub triggers: &'static [&'static str],
    pub response: &'static str,
    pub instructions: &'static [&'static str],
    pub severity: Severity,
    pub call_emergency: bool,
}

/// One ordered classification rule.
pub(crate) struct Rule {
    /// Stable rule name, used for logging and diagnostics.
    pub name: &'static str,
    /// The rule matches when ANY trigger is contained in the normalized input.
    pub triggers: &'static [&'static str],
    /// Severity tiers, most specific first; the last tier is the default.
    pub tiers: &'static [Tier],
}

impl Rule {
    pub fn matches(&self, normalized: &str) -> bool {
        self.triggers.iter().any(|t| normalized.contains(t))
    }

    /// Selects the first tier whose secondary triggers match, falling back
    /// to the default tier. A rule's last tier has an empty trigger set, so
    /// this always resolves within the rule.
    pub fn tier_for(&self, normalized: &str) -> &Tier {
        self.tiers
            .iter()
            .find(|tier| {
                tier.triggers.is_empty() || tier.triggers.iter().any(|t| normalized.contains(t))
            })
            .unwrap_or(&DEFAULT_TIER)
    }
}

pub(crate) static RULES: &[Rule] = &[
    Rule {
        name: "atragantamiento",
        triggers: &["asfixia", "atragant", "no puede respirar", "ahog"],
        tiers: &[Tier {
            triggers: &[],
            response: "EMERGENCIA CRÍTICA: Atragantamiento detectado.",
            instructions: &[
                "Preguntar: \"¿Te estás atragantando?\" Si no puede responder, actuar inmediatamente",
                "Colocarse detrás de la persona",
                "Rodear el abdomen con los brazos",
                "Colocar el puño sobre el ombligo y la otra mano encima",
                "Realizar compresiones abdominales rápidas hacia adentro y arriba (maniobra de Heimlich)",
                "Repetir hasta que expulse el objeto o pierda la conciencia",
            ],
            severity: Severity::Critical,
            call_emergency: true,
        }],
    },
    Rule {
        name: "paro-cardiorrespiratorio",
        triggers: &["no responde", "inconsciente", "no respira", "rcp"],
        tiers: &[Tier {
            triggers: &[],
            response: "EMERGENCIA CRÍTICA: Posible paro cardiorrespiratorio.",
            instructions: &[
                "Verificar respuesta: golpear los hombros y gritar \"¿Estás bien?\"",
                "Si no responde y no respira: llamar a emergencias inmediatamente",
                "Iniciar RCP: colocar las manos en el centro del pecho",
                "Brazos rectos, presionar fuerte y rápido: 100-120 compresiones por minuto",
                "Permitir el retroceso completo del pecho entre compresiones",
                "No detenerse hasta que llegue ayuda profesional",
            ],
            severity: Severity::Critical,
            call_emergency: true,
        }],
    },
    Rule {
        name: "trauma-penetrante",
        triggers: &["disparo", "dispararon", "bala", "cuchillo", "objeto clavado"],
        tiers: &[Tier {
            triggers: &[],
            response: "EMERGENCIA CRÍTICA: Trauma penetrante detectado.",
            instructions: &[
                "No retirar la bala ni el objeto incrustado",
                "Aplicar presión directa alrededor de la herida con ropa limpia, sin presionar sobre el objeto",
                "Estabilizar el objeto con vendajes alrededor",
                "Elevar la zona herida por encima del corazón si es posible",
                "Mantener a la persona calmada y acostada",
                "Vigilar la conciencia y la respiración constantemente",
            ],
            severity: Severity::Critical,
            call_emergency: true,
        }],
    },
    Rule {
        name: "dolor-toracico",
        triggers: &["dolor pecho", "pecho duele", "infarto", "corazón"],
        tiers: &[
            Tier {
                triggers: &["opresivo", "sudor", "náuseas", "falta aire"],
                response: "EMERGENCIA: Síntomas de posible infarto detectados.",
                instructions: &[
                    "Sentar o acostar a la persona en posición cómoda",
                    "Aflojar la ropa ajustada",
                    "Si tiene nitroglicerina prescrita, administrar",
                    "No dejar sola a la persona",
                    "Prepararse para RCP si pierde la conciencia",
                ],
                severity: Severity::Critical,
                call_emergency: true,
            },
            Tier {
                triggers: &[],
                response: "¿Es un dolor punzante que ocurre al moverse o respirar hondo?",
                instructions: &[
                    "Puede ser dolor muscular",
                    "Reposar y observar",
                    "Si empeora o aparecen otros síntomas, buscar atención médica",
                ],
                severity: Severity::Low,
                call_emergency: false,
            },
        ],
    },
    Rule {
        name: "hemorragia-severa",
        triggers: &["mucha sangre", "sangrado abundante", "no para de sangrar"],
        tiers: &[Tier {
            triggers: &[],
            response: "EMERGENCIA: Hemorragia severa detectada.",
            instructions: &[
                "Presionar con fuerza usando tela limpia o gasa",
                "No retirar el apósito si se empapa, añadir más encima",
                "Elevar la zona herida por encima del corazón si es posible",
                "Mantener presión constante",
                "Llamar a emergencias inmediatamente",
            ],
            severity: Severity::Critical,
            call_emergency: true,
        }],
    },
    Rule {
        name: "quemadura",
        triggers: &["quemadura", "quemé", "fuego", "caliente"],
        tiers: &[
            Tier {
                triggers: &["ampolla", "húmeda", "grande"],
                response: "Quemadura de segundo grado detectada.",
                instructions: &[
                    "Enfriar con agua a temperatura ambiente por 10-15 minutos",
                    "Cubrir con gasa estéril sin apretar",
                    "No romper las ampollas",
                    "No aplicar cremas, pasta dental ni remedios caseros",
                    "Si la zona es grande o en partes sensibles: llamar a emergencias",
                ],
                severity: Severity::Medium,
                call_emergency: false,
            },
            Tier {
                triggers: &[],
                response: "Quemadura superficial identificada.",
                instructions: &[
                    "Enfriar con agua corriente (no helada) por 10-20 minutos",
                    "No usar hielo, manteca ni pasta dental",
                    "Secar con suavidad y cubrir con gasa estéril",
                    "Puede tomar un analgésico si ya lo ha usado antes",
                ],
                severity: Severity::Low,
                call_emergency: false,
            },
        ],
    },
    Rule {
        name: "fractura",
        triggers: &["fractura", "hueso roto", "no puedo mover", "deformidad"],
        tiers: &[Tier {
            triggers: &[],
            response: "Posible fractura detectada.",
            instructions: &[
                "No mover la zona afectada",
                "Inmovilizar con una férula improvisada si sabe cómo hacerlo",
                "Aplicar hielo envuelto en tela",
                "Controlar el dolor sin mover el hueso",
                "Buscar atención médica urgente",
            ],
            severity: Severity::High,
            call_emergency: true,
        }],
    },
    Rule {
        name: "herida-cortante",
        triggers: &["corte", "herida", "sangre"],
        tiers: &[Tier {
            triggers: &[],
            response: "Herida con sangrado identificada.",
            instructions: &[
                "Mantener la calma y evaluar la situación",
                "Aplicar presión directa sobre la herida con un paño limpio",
                "Elevar la parte lesionada por encima del corazón si es posible",
                "No remover objetos incrustados en la herida",
                "Mantener la presión hasta que llegue ayuda médica",
            ],
            severity: Severity::Medium,
            call_emergency: true,
        }],
    },
    Rule {
        name: "crisis-ansiedad",
        triggers: &["ansiedad", "pánico", "respiración rápida", "palpitaciones"],
        tiers: &[Tier {
            triggers: &[],
            response: "¿La persona respira rápido, con miedo o palpitaciones?",
            instructions: &[
                "Hablar con voz calmada y tranquilizadora",
                "Guiar la respiración: \"Inhala contando hasta 4, exhala contando hasta 4\"",
                "Permanecer cerca hasta que se calme",
                "Si hay dolor en el pecho, desmayo o confusión: llamar a emergencias",
            ],
            severity: Severity::Medium,
            call_emergency: false,
        }],
    },
    Rule {
        name: "intoxicacion-alimentaria",
        triggers: &["intoxicación", "vómito", "diarrea", "comida mala"],
        tiers: &[Tier {
            triggers: &[],
            response: "¿Hay vómito, diarrea o dolor abdominal leve?",
            instructions: &[
                "Hidratación con agua o suero oral en sorbos pequeños",
                "Reposo absoluto",
                "Observar si mejora en pocas horas",
                "Si hay fiebre alta, sangre en vómito o diarrea, o dolor intenso: llamar a emergencias",
            ],
            severity: Severity::Medium,
            call_emergency: false,
        }],
    },
    Rule {
        name: "dolor-abdominal",
        triggers: &["dolor abdominal", "dolor estómago", "dolor barriga"],
        tiers: &[Tier {
            triggers: &[],
            response: "¿Es un dolor leve, sin fiebre ni vómitos?",
            instructions: &[
                "Reposar en posición cómoda",
                "No comer ni tomar nada por 1 hora",
                "Observar si mejora",
                "Si hay dolor agudo persistente, fiebre o vómito: llamar a emergencias",
            ],
            severity: Severity::Medium,
            call_emergency: false,
        }],
    },
    Rule {
        name: "cuerpo-extrano-ojo",
        triggers: &["ojo", "cuerpo extraño", "basura en el ojo"],
        tiers: &[Tier {
            triggers: &[],
            response: "¿Hay algo visible flotando en el ojo?",
            instructions: &[
                "No frotar el ojo",
                "Intentar parpadear varias veces",
                "Si no se va, enjuagar con agua limpia o suero salino",
                "Si hay dolor fuerte, visión borrosa o sangrado: no tocar más, cubrir con gasa y llamar a emergencias",
            ],
            severity: Severity::Medium,
            call_emergency: false,
        }],
    },
    Rule {
        name: "astilla",
        triggers: &["astilla", "espina", "pincho"],
        tiers: &[Tier {
            triggers: &[],
            response: "¿La astilla está parcialmente afuera y es pequeña?",
            instructions: &[
                "Lavar la zona con agua y jabón",
                "Usar pinzas limpias para extraer si está superficial",
                "Lavar nuevamente y cubrir con un apósito",
                "Si está muy profunda, no intentar extraer: cubrir y buscar atención médica",
            ],
            severity: Severity::Low,
            call_emergency: false,
        }],
    },
];

/// The fixed response returned when no rule matches.
pub(crate) static DEFAULT_TIER: Tier = Tier {
    triggers: &[],
    response: "He registrado tu emergencia. Para brindarte la mejor ayuda, necesito más información específica.",
    instructions: &[
        "Mantén la calma y respira profundamente",
        "Evalúa si hay peligro inmediato",
        "Describe síntomas específicos: dolor, sangrado, dificultad para respirar",
        "Indica si la persona está consciente y puede hablar",
    ],
    severity: Severity::Medium,
    call_emergency: false,
};
